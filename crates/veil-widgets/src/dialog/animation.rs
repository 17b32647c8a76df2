#![forbid(unsafe_code)]

//! Visibility phase machine and the inline styles each phase renders.
//!
//! The machine is pure: [`DialogPhase::apply`] maps a phase and a
//! [`PhaseCommand`] to the next phase plus the side effects the widget must
//! perform ([`PhaseEffects`]). Timers, DOM work, and listeners live in the
//! widget; nothing here touches them.
//!
//! ```text
//!            Open                 ShowElapsed
//!  Closed ──────────▶ Appearing ─────────────▶ Visible
//!    ▲                  │   ▲                    │
//!    │ HideElapsed      │   │ Open               │ Close
//!    │            Close ▼   │                    ▼
//!    └──────────────── Disappearing ◀────────────┘
//! ```
//!
//! `ForceClose` jumps from any phase straight to `Closed`.
//!
//! # Invariants
//!
//! 1. `MOUNT` is emitted only when leaving `Closed`; `UNMOUNT` only when
//!    entering `Closed`. Mounts and unmounts therefore alternate.
//! 2. Elapsed-timer commands that no longer match the current phase are
//!    ignored, so a stale timer can never move the machine.
//! 3. Repeating `Open` or `Close` in a phase that already satisfies it is a
//!    no-op with no effects.

use bitflags::bitflags;
use veil_style::InlineStyle;

use super::config::DialogConfig;

/// CSS class present on overlay and panel while [`DialogPhase::Visible`].
pub const OPEN_CLASS: &str = "open";

/// Vertical offset of the panel before it slides in.
pub const SLIDE_OFFSET: &str = "translateY(-20px)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogPhase {
    /// Not mounted; renders nothing.
    #[default]
    Closed,
    /// Mounted at zero opacity, waiting for the fade-in to start.
    Appearing,
    /// Fully shown and interactive.
    Visible,
    /// Fading out; unmounts when the fade completes.
    Disappearing,
}

/// Inputs to the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseCommand {
    Open,
    Close,
    /// The fade-in delay elapsed.
    ShowElapsed,
    /// The fade-out finished.
    HideElapsed,
    /// Skip the animation and unmount now.
    ForceClose,
}

bitflags! {
    /// Side effects requested by a transition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PhaseEffects: u8 {
        const MOUNT = 1 << 0;
        const UNMOUNT = 1 << 1;
        const SCHEDULE_SHOW = 1 << 2;
        const CANCEL_SHOW = 1 << 3;
        const SCHEDULE_HIDE = 1 << 4;
        const CANCEL_HIDE = 1 << 5;
    }
}

/// Result of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DialogPhase,
    pub to: DialogPhase,
    pub effects: PhaseEffects,
}

impl Transition {
    /// Whether the command moved the machine.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl DialogPhase {
    /// Nodes are in the document.
    #[must_use]
    pub const fn is_mounted(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Keyboard handling (Escape, focus trap) is active.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Appearing | Self::Visible)
    }

    /// The overlay accepts pointer events.
    #[must_use]
    pub const fn accepts_pointer(self) -> bool {
        matches!(self, Self::Visible)
    }

    #[must_use]
    pub fn apply(self, command: PhaseCommand) -> Transition {
        use DialogPhase as P;
        use PhaseCommand as C;

        let (to, effects) = match (self, command) {
            (P::Closed, C::Open) => (P::Appearing, PhaseEffects::MOUNT | PhaseEffects::SCHEDULE_SHOW),
            (P::Disappearing, C::Open) => (
                P::Appearing,
                PhaseEffects::CANCEL_HIDE | PhaseEffects::SCHEDULE_SHOW,
            ),
            (P::Appearing, C::Close) => (
                P::Disappearing,
                PhaseEffects::CANCEL_SHOW | PhaseEffects::SCHEDULE_HIDE,
            ),
            (P::Visible, C::Close) => (P::Disappearing, PhaseEffects::SCHEDULE_HIDE),
            (P::Appearing, C::ShowElapsed) => (P::Visible, PhaseEffects::empty()),
            (P::Disappearing, C::HideElapsed) => (P::Closed, PhaseEffects::UNMOUNT),
            (P::Closed, C::ForceClose) => (P::Closed, PhaseEffects::empty()),
            (_, C::ForceClose) => (
                P::Closed,
                PhaseEffects::CANCEL_SHOW | PhaseEffects::CANCEL_HIDE | PhaseEffects::UNMOUNT,
            ),
            (phase, _) => (phase, PhaseEffects::empty()),
        };

        Transition {
            from: self,
            to,
            effects,
        }
    }

    /// Inline styles for the overlay and panel in this phase.
    #[must_use]
    pub fn styles(self, config: &DialogConfig) -> PhaseStyles {
        PhaseStyles::compute(self, config)
    }
}

/// Rendered inline styles for one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStyles {
    pub overlay: InlineStyle,
    pub panel: InlineStyle,
    /// Whether the [`OPEN_CLASS`] is applied.
    pub open: bool,
}

impl PhaseStyles {
    #[must_use]
    pub fn compute(phase: DialogPhase, config: &DialogConfig) -> Self {
        let shown = matches!(phase, DialogPhase::Visible);
        let ms = config.fade_duration_ms;

        let mut overlay = InlineStyle::new();
        overlay.set_color("background-color", config.overlay_color);
        overlay.set("transition", format!("opacity {ms}ms"));
        overlay.set_opacity(if shown { 1.0 } else { 0.0 });
        overlay.set("pointer-events", if phase.accepts_pointer() { "auto" } else { "none" });

        let transform = match (config.use_slide_transform, shown) {
            (false, _) => "none",
            (true, true) => "translateY(0)",
            (true, false) => SLIDE_OFFSET,
        };

        let mut panel = InlineStyle::new();
        panel.set("transition", format!("opacity {ms}ms, transform {ms}ms"));
        panel.set_opacity(if shown { 1.0 } else { 0.0 });
        panel.set("transform", transform);
        panel.set_color("background-color", config.background_color);
        panel.set_color("color", config.text_color);
        panel.set_length("border-radius", config.effective_corner_radius());

        Self {
            overlay,
            panel,
            open: shown,
        }
    }
}
