#![forbid(unsafe_code)]

//! Modal dialog: configuration, phase machine, focus trap, and the widget.
//!
//! # Layers
//!
//! - [`config`]: partial [`DialogOptions`] resolved into [`DialogConfig`].
//! - [`animation`]: the pure [`DialogPhase`] machine and per-phase styles.
//! - [`focus_trap`]: Tab wrap-around decisions.
//! - [`widget`]: [`Dialog`], which wires the above into a document.

pub mod animation;
pub mod config;
pub mod focus_trap;
pub mod widget;

pub use animation::{DialogPhase, PhaseCommand, PhaseEffects, PhaseStyles, Transition};
pub use config::{ConfigError, DialogConfig, DialogOptions};
pub use focus_trap::{TrapDecision, enter_trap, trap_tab};
pub use widget::{
    CLOSE_BUTTON_CLASS, CONTENT_CLASS, Dialog, DialogElements, OVERLAY_CLASS, PANEL_CLASS,
};
