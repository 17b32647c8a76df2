#![forbid(unsafe_code)]

//! The dialog widget: mounts an overlay into a [`Document`], animates it
//! through [`DialogPhase`]s on a [`Scheduler`], and traps keyboard focus.
//!
//! # Render boundary
//!
//! ```text
//! div.veil-overlay[role=dialog][aria-modal=true]   click: close if allowed
//! └── div.veil-dialog                               click: stop propagation
//!     ├── button.veil-close                         click: close (optional)
//!     └── div.veil-content                          <- content fragment
//! ```
//!
//! # Invariants
//!
//! 1. Exactly one keydown listener is registered while mounted, none while
//!    closed. It is removed synchronously on unmount.
//! 2. Content and configuration are snapshotted at mount. Changing them while
//!    mounted affects the next mount only.
//! 3. Timer and listener callbacks hold only weak references; once the
//!    widget is dropped they do nothing.
//! 4. Dropping the widget unmounts it immediately and cancels its timers.
//!
//! # Failure Modes
//!
//! - If the document refuses an insertion (it never should, the root is
//!   permanent) the mount is abandoned with a `warn!` and the phase machine
//!   still advances, so a later close or force-close stays consistent.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use veil_core::dom::{ClickDispatch, Document, ElementId, Fragment, KeyDispatch, ListenerGuard, Node};
use veil_core::event::{KeyCode, KeyEvent};
use veil_runtime::timer::{Scheduler, TimerGuard};

use super::animation::{DialogPhase, OPEN_CLASS, PhaseCommand, PhaseEffects, Transition};
use super::config::{DialogConfig, DialogOptions};
use super::focus_trap::{TrapDecision, trap_tab};

/// Class of the full-screen overlay element.
pub const OVERLAY_CLASS: &str = "veil-overlay";
/// Class of the dialog panel.
pub const PANEL_CLASS: &str = "veil-dialog";
/// Class of the close button.
pub const CLOSE_BUTTON_CLASS: &str = "veil-close";
/// Class of the element holding the caller's content.
pub const CONTENT_CLASS: &str = "veil-content";

/// Element ids of a mounted dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogElements {
    pub overlay: ElementId,
    pub panel: ElementId,
    pub close_button: Option<ElementId>,
    pub content: ElementId,
}

struct Mounted {
    elements: DialogElements,
    focusables: Rc<[ElementId]>,
    previous_focus: Option<ElementId>,
    config: DialogConfig,
    listener: ListenerGuard,
}

struct DialogInner {
    doc: Document,
    scheduler: Scheduler,
    on_close: Option<Rc<dyn Fn()>>,
    phase: DialogPhase,
    config: DialogConfig,
    content: Fragment,
    mounted: Option<Mounted>,
    show_timer: Option<TimerGuard>,
    hide_timer: Option<TimerGuard>,
}

#[derive(Clone)]
struct Shared(Rc<RefCell<DialogInner>>);

/// An animated, focus-trapping modal dialog.
///
/// The widget is the sole owner of its state; it is deliberately not
/// `Clone`. Dropping it unmounts everything it inserted.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use veil_core::dom::{Document, Node};
/// use veil_runtime::Scheduler;
/// use veil_widgets::dialog::{Dialog, DialogPhase};
///
/// let doc = Document::new();
/// let scheduler = Scheduler::new();
/// let dialog = Dialog::new(&doc, &scheduler).content(Node::paragraph("Saved."));
///
/// dialog.open();
/// assert_eq!(dialog.phase(), DialogPhase::Appearing);
/// scheduler.advance(Duration::from_millis(150));
/// assert_eq!(dialog.phase(), DialogPhase::Visible);
/// ```
pub struct Dialog {
    shared: Shared,
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.0.borrow();
        f.debug_struct("Dialog")
            .field("phase", &inner.phase)
            .field("mounted", &inner.mounted.as_ref().map(|m| &m.elements))
            .field("show_pending", &inner.show_timer.is_some())
            .field("hide_pending", &inner.hide_timer.is_some())
            .finish()
    }
}

impl Dialog {
    /// Create a closed dialog rendering into `doc` and timing on `scheduler`.
    #[must_use]
    pub fn new(doc: &Document, scheduler: &Scheduler) -> Self {
        Self {
            shared: Shared(Rc::new(RefCell::new(DialogInner {
                doc: doc.clone(),
                scheduler: scheduler.clone(),
                on_close: None,
                phase: DialogPhase::Closed,
                config: DialogConfig::default(),
                content: Fragment::new(),
                mounted: None,
                show_timer: None,
                hide_timer: None,
            }))),
        }
    }

    /// Set the close callback (builder form).
    ///
    /// Without one, a close request (Escape, overlay, close button) closes
    /// the widget directly.
    #[must_use]
    pub fn on_close(self, callback: impl Fn() + 'static) -> Self {
        self.set_on_close(callback);
        self
    }

    /// Set the content for the next mount (builder form).
    #[must_use]
    pub fn content(self, content: impl Into<Fragment>) -> Self {
        self.set_content(content);
        self
    }

    /// Set the options for the next mount (builder form).
    #[must_use]
    pub fn options(self, options: &DialogOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_on_close(&self, callback: impl Fn() + 'static) {
        let previous = self.shared.0.borrow_mut().on_close.replace(Rc::new(callback));
        drop(previous);
    }

    pub fn set_content(&self, content: impl Into<Fragment>) {
        let previous = std::mem::replace(&mut self.shared.0.borrow_mut().content, content.into());
        drop(previous);
    }

    /// Resolve `options` against the defaults and keep them for the next mount.
    pub fn set_options(&self, options: &DialogOptions) {
        self.set_config(options.resolve());
    }

    pub fn set_config(&self, config: DialogConfig) {
        self.shared.0.borrow_mut().config = config;
    }

    // --- Lifecycle ---

    /// Request the dialog to open.
    pub fn open(&self) {
        self.shared.apply(PhaseCommand::Open);
    }

    /// Request the dialog to close with its fade-out.
    pub fn close(&self) {
        self.shared.apply(PhaseCommand::Close);
    }

    /// Open or close to match `open`.
    pub fn set_open(&self, open: bool) {
        if open {
            self.open();
        } else {
            self.close();
        }
    }

    /// Unmount immediately, skipping the fade-out.
    pub fn force_close(&self) {
        self.shared.apply(PhaseCommand::ForceClose);
    }

    /// Emit the close signal, exactly as the close button does.
    pub fn request_close(&self) {
        self.shared.request_close();
    }

    // --- Queries ---

    #[must_use]
    pub fn phase(&self) -> DialogPhase {
        self.shared.0.borrow().phase
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.shared.0.borrow().mounted.is_some()
    }

    /// Configuration in effect: the mounted snapshot when mounted, otherwise
    /// the one the next mount will use.
    #[must_use]
    pub fn config(&self) -> DialogConfig {
        let inner = self.shared.0.borrow();
        match &inner.mounted {
            Some(mounted) => mounted.config.clone(),
            None => inner.config.clone(),
        }
    }

    #[must_use]
    pub fn elements(&self) -> Option<DialogElements> {
        self.shared
            .0
            .borrow()
            .mounted
            .as_ref()
            .map(|m| m.elements.clone())
    }

    /// Focusable elements of the mounted panel, in document order.
    #[must_use]
    pub fn focusables(&self) -> Vec<ElementId> {
        self.shared
            .0
            .borrow()
            .mounted
            .as_ref()
            .map(|m| m.focusables.to_vec())
            .unwrap_or_default()
    }

    /// Whether a show or hide timer is outstanding.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        let inner = self.shared.0.borrow();
        inner.show_timer.is_some() || inner.hide_timer.is_some()
    }
}

impl Drop for Dialog {
    fn drop(&mut self) {
        self.shared.apply(PhaseCommand::ForceClose);
    }
}

impl Shared {
    fn upgrade(weak: &Weak<RefCell<DialogInner>>) -> Option<Self> {
        weak.upgrade().map(Self)
    }

    fn downgrade(&self) -> Weak<RefCell<DialogInner>> {
        Rc::downgrade(&self.0)
    }

    fn apply(&self, command: PhaseCommand) -> Transition {
        let transition = self.0.borrow().phase.apply(command);
        if !transition.changed() && transition.effects.is_empty() {
            return transition;
        }

        let cancelled = {
            let mut inner = self.0.borrow_mut();
            inner.phase = transition.to;
            let mut cancelled = Vec::new();
            if transition.effects.contains(PhaseEffects::CANCEL_SHOW) {
                cancelled.extend(inner.show_timer.take());
            }
            if transition.effects.contains(PhaseEffects::CANCEL_HIDE) {
                cancelled.extend(inner.hide_timer.take());
            }
            cancelled
        };
        drop(cancelled);

        tracing::debug!(
            from = ?transition.from,
            to = ?transition.to,
            ?command,
            "dialog.transition"
        );

        if transition.effects.contains(PhaseEffects::UNMOUNT) {
            self.unmount();
        }
        if transition.effects.contains(PhaseEffects::MOUNT) {
            self.mount();
        }
        if transition.effects.contains(PhaseEffects::SCHEDULE_SHOW) {
            let delay = self.mounted_config().fade_delay();
            self.schedule(PhaseCommand::ShowElapsed, delay);
        }
        if transition.effects.contains(PhaseEffects::SCHEDULE_HIDE) {
            let delay = self.mounted_config().fade_duration();
            self.schedule(PhaseCommand::HideElapsed, delay);
        }
        self.restyle();
        transition
    }

    fn mounted_config(&self) -> DialogConfig {
        let inner = self.0.borrow();
        inner
            .mounted
            .as_ref()
            .map_or_else(|| inner.config.clone(), |m| m.config.clone())
    }

    fn schedule(&self, command: PhaseCommand, delay: Duration) {
        let weak = self.downgrade();
        let scheduler = self.0.borrow().scheduler.clone();
        let guard = scheduler.set_timeout(delay, move || {
            if let Some(shared) = Shared::upgrade(&weak) {
                shared.timer_elapsed(command);
            }
        });
        let previous = {
            let mut inner = self.0.borrow_mut();
            let slot = match command {
                PhaseCommand::ShowElapsed => &mut inner.show_timer,
                _ => &mut inner.hide_timer,
            };
            slot.replace(guard)
        };
        drop(previous);
    }

    fn timer_elapsed(&self, command: PhaseCommand) {
        let fired = {
            let mut inner = self.0.borrow_mut();
            match command {
                PhaseCommand::ShowElapsed => inner.show_timer.take(),
                _ => inner.hide_timer.take(),
            }
        };
        drop(fired);
        self.apply(command);
    }

    fn mount(&self) {
        let (doc, config, content) = {
            let inner = self.0.borrow();
            (inner.doc.clone(), inner.config.clone(), inner.content.clone())
        };
        let previous_focus = doc.active_element();

        let Some(elements) = build_tree(&doc, &config, &content) else {
            tracing::warn!("dialog.mount: document rejected the dialog nodes");
            return;
        };

        let weak = self.downgrade();
        doc.set_click_handler(elements.overlay, move |_| {
            if let Some(shared) = Shared::upgrade(&weak) {
                shared.overlay_clicked();
            }
        });
        doc.set_click_handler(elements.panel, ClickDispatch::stop_propagation);
        if let Some(button) = elements.close_button {
            let weak = self.downgrade();
            doc.set_click_handler(button, move |dispatch: &mut ClickDispatch| {
                dispatch.stop_propagation();
                if let Some(shared) = Shared::upgrade(&weak) {
                    shared.close_button_clicked();
                }
            });
        }

        let weak = self.downgrade();
        let listener = doc.add_key_listener(move |event, dispatch| {
            if let Some(shared) = Shared::upgrade(&weak) {
                shared.key_down(event, dispatch);
            }
        });

        let focusables: Rc<[ElementId]> = doc.query_focusable(elements.panel).into();
        if let Some(&first) = focusables.first() {
            doc.focus(first);
        }

        tracing::debug!(
            overlay = elements.overlay.id(),
            focusables = focusables.len(),
            "dialog.mount"
        );

        self.0.borrow_mut().mounted = Some(Mounted {
            elements,
            focusables,
            previous_focus,
            config,
            listener,
        });
    }

    fn unmount(&self) {
        let (mounted, doc) = {
            let mut inner = self.0.borrow_mut();
            (inner.mounted.take(), inner.doc.clone())
        };
        let Some(Mounted {
            elements,
            previous_focus,
            config,
            listener,
            ..
        }) = mounted
        else {
            return;
        };

        drop(listener);
        doc.remove(elements.overlay);

        if config.restore_focus
            && doc.active_element().is_none()
            && let Some(previous) = previous_focus
            && doc.contains(previous)
        {
            doc.focus(previous);
        }

        tracing::debug!(overlay = elements.overlay.id(), "dialog.unmount");
    }

    fn restyle(&self) {
        let (doc, phase, elements, config) = {
            let inner = self.0.borrow();
            let Some(mounted) = &inner.mounted else {
                return;
            };
            (
                inner.doc.clone(),
                inner.phase,
                mounted.elements.clone(),
                mounted.config.clone(),
            )
        };
        let styles = phase.styles(&config);
        doc.update_style(elements.overlay, |style| *style = styles.overlay);
        doc.update_style(elements.panel, |style| *style = styles.panel);
        for id in [elements.overlay, elements.panel] {
            doc.toggle_class(id, OPEN_CLASS, styles.open);
        }
    }

    fn request_close(&self) {
        let callback = self.0.borrow().on_close.clone();
        match callback {
            Some(callback) => callback(),
            None => {
                self.apply(PhaseCommand::Close);
            }
        }
    }

    fn overlay_clicked(&self) {
        let allowed = {
            let inner = self.0.borrow();
            inner.phase.accepts_pointer()
                && inner
                    .mounted
                    .as_ref()
                    .is_some_and(|m| m.config.click_outside_closes)
        };
        tracing::trace!(allowed, "dialog.overlay_click");
        if allowed {
            self.request_close();
        }
    }

    fn close_button_clicked(&self) {
        if self.0.borrow().phase.accepts_pointer() {
            self.request_close();
        }
    }

    fn key_down(&self, event: &KeyEvent, dispatch: &mut KeyDispatch) {
        let (doc, phase, escape_closes, focusables) = {
            let inner = self.0.borrow();
            let Some(mounted) = &inner.mounted else {
                return;
            };
            (
                inner.doc.clone(),
                inner.phase,
                mounted.config.escape_closes,
                Rc::clone(&mounted.focusables),
            )
        };
        if !phase.is_interactive() {
            return;
        }

        if event.code == KeyCode::Escape {
            tracing::trace!(escape_closes, "dialog.escape");
            if escape_closes {
                self.request_close();
            }
            return;
        }

        if event.is_tab() {
            let active = doc.active_element();
            let reverse = event.is_reverse_tab();
            let decision = trap_tab(&focusables, active, reverse);
            tracing::trace!(?decision, reverse, "dialog.tab");
            if let TrapDecision::Redirect(target) = decision {
                dispatch.prevent_default();
                doc.focus(target);
            }
        }
    }
}

fn build_tree(doc: &Document, config: &DialogConfig, content: &Fragment) -> Option<DialogElements> {
    let overlay = doc.append(
        doc.root(),
        &Node::div()
            .class(OVERLAY_CLASS)
            .attr("role", "dialog")
            .attr("aria-modal", "true"),
    )?;
    let panel = doc.append(overlay, &Node::div().class(PANEL_CLASS))?;
    let close_button = if config.show_close_button {
        let button = Node::button(config.close_button_label.clone())
            .class(CLOSE_BUTTON_CLASS)
            .attr("aria-label", "Close");
        Some(doc.append(panel, &button)?)
    } else {
        None
    };
    let content_el = doc.append(panel, &Node::div().class(CONTENT_CLASS))?;
    doc.append_fragment(content_el, content);
    Some(DialogElements {
        overlay,
        panel,
        close_button,
        content: content_el,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use veil_core::event::Modifiers;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (Document, Scheduler) {
        (Document::new(), Scheduler::new())
    }

    fn form() -> Fragment {
        Fragment::from(vec![
            Node::paragraph("Delete file?"),
            Node::input().attr("name", "confirm"),
            Node::button("Delete"),
        ])
    }

    #[test]
    fn closed_dialog_renders_nothing() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert!(dialog.elements().is_none());
        assert!(doc.is_empty());
        assert_eq!(doc.key_listener_count(), 0);
    }

    #[test]
    fn open_mounts_and_becomes_visible_after_delay() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();

        let elements = dialog.elements().unwrap();
        assert_eq!(dialog.phase(), DialogPhase::Appearing);
        assert_eq!(doc.key_listener_count(), 1);
        assert_eq!(doc.attr(elements.overlay, "role").as_deref(), Some("dialog"));
        assert_eq!(doc.attr(elements.overlay, "aria-modal").as_deref(), Some("true"));
        assert!(!doc.has_class(elements.overlay, OPEN_CLASS));

        scheduler.advance(ms(149));
        assert_eq!(dialog.phase(), DialogPhase::Appearing);
        scheduler.advance(ms(1));
        assert_eq!(dialog.phase(), DialogPhase::Visible);
        assert!(doc.has_class(elements.overlay, OPEN_CLASS));
        assert!(doc.has_class(elements.panel, OPEN_CLASS));
        assert!(!dialog.has_pending_timer());
    }

    #[test]
    fn first_focusable_is_focused_on_mount() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler)
            .content(form())
            .options(&DialogOptions::new().show_close_button(false));
        dialog.open();
        let focusables = dialog.focusables();
        assert_eq!(focusables.len(), 2);
        assert_eq!(doc.active_element(), Some(focusables[0]));
        assert_eq!(doc.tag(focusables[0]), Some(veil_core::dom::Tag::Input));
    }

    #[test]
    fn close_button_is_first_focusable_when_shown() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        let elements = dialog.elements().unwrap();
        assert_eq!(dialog.focusables()[0], elements.close_button.unwrap());
        assert_eq!(doc.text(elements.close_button.unwrap()).as_deref(), Some("×"));
    }

    #[test]
    fn close_fades_out_then_unmounts() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        scheduler.advance(ms(150));
        dialog.close();
        assert_eq!(dialog.phase(), DialogPhase::Disappearing);
        assert!(dialog.is_mounted());

        scheduler.advance(ms(299));
        assert!(dialog.is_mounted());
        scheduler.advance(ms(1));
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert!(doc.is_empty());
        assert_eq!(doc.key_listener_count(), 0);
        assert_eq!(doc.click_handler_count(), 0);
    }

    #[test]
    fn close_during_appearing_waits_full_fade() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        dialog.open();
        scheduler.advance(ms(50));
        dialog.close();
        scheduler.advance(ms(200));
        assert_eq!(dialog.phase(), DialogPhase::Disappearing);
        scheduler.advance(ms(100));
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn reopen_while_disappearing_keeps_single_mount() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        dialog.open();
        scheduler.advance(ms(150));
        let elements = dialog.elements().unwrap();
        dialog.close();
        scheduler.advance(ms(100));
        dialog.open();
        assert_eq!(dialog.phase(), DialogPhase::Appearing);
        assert_eq!(dialog.elements().unwrap(), elements);
        assert_eq!(doc.key_listener_count(), 1);
        scheduler.advance(ms(300));
        assert_eq!(dialog.phase(), DialogPhase::Visible);
    }

    #[test]
    fn force_close_is_immediate() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        dialog.open();
        dialog.force_close();
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert!(doc.is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn escape_invokes_close_callback() {
        let (doc, scheduler) = setup();
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let dialog = Dialog::new(&doc, &scheduler).on_close(move || counter.set(counter.get() + 1));
        dialog.open();
        doc.dispatch_key(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(closes.get(), 1);
        assert_eq!(dialog.phase(), DialogPhase::Appearing);
    }

    #[test]
    fn escape_without_callback_closes_directly() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        dialog.open();
        doc.dispatch_key(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(dialog.phase(), DialogPhase::Disappearing);
    }

    #[test]
    fn escape_disabled_leaves_phase() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).options(&DialogOptions::new().escape_closes(false));
        dialog.open();
        scheduler.advance(ms(150));
        doc.dispatch_key(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(dialog.phase(), DialogPhase::Visible);
    }

    #[test]
    fn listener_is_inert_while_disappearing() {
        let (doc, scheduler) = setup();
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let dialog = Dialog::new(&doc, &scheduler).on_close(move || counter.set(counter.get() + 1));
        dialog.open();
        dialog.close();
        doc.dispatch_key(&KeyEvent::new(KeyCode::Escape));
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn tab_wraps_inside_panel() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        let f = dialog.focusables();
        assert_eq!(f.len(), 3);

        for expected in [f[1], f[2], f[0]] {
            doc.dispatch_key(&KeyEvent::new(KeyCode::Tab));
            assert_eq!(doc.active_element(), Some(expected));
        }
        let outcome = doc.dispatch_key(&KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT));
        assert!(outcome.default_prevented);
        assert_eq!(doc.active_element(), Some(f[2]));
    }

    #[test]
    fn tab_from_outside_is_pulled_back() {
        let (doc, scheduler) = setup();
        let page_button = doc.append(doc.root(), &Node::button("page")).unwrap();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        doc.focus(page_button);
        doc.dispatch_key(&KeyEvent::new(KeyCode::BackTab));
        assert_eq!(doc.active_element(), dialog.focusables().last().copied());
    }

    #[test]
    fn opted_out_control_stays_out_of_the_cycle() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler)
            .content(vec![Node::button("Keep"), Node::button("Skip").tabindex(-1)])
            .options(&DialogOptions::new().show_close_button(false));
        dialog.open();
        doc.append(doc.root(), &Node::button("page"));

        let f = dialog.focusables();
        assert_eq!(f.len(), 1);
        assert_eq!(doc.active_element(), Some(f[0]));
        for _ in 0..3 {
            doc.dispatch_key(&KeyEvent::new(KeyCode::Tab));
            assert_eq!(doc.active_element(), Some(f[0]));
        }
    }

    #[test]
    fn tab_from_unlisted_panel_element_reenters_the_cycle() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        doc.append(doc.root(), &Node::button("page"));
        let content = dialog.elements().unwrap().content;
        let paragraph = doc.children(content)[0];

        doc.focus(paragraph);
        doc.dispatch_key(&KeyEvent::new(KeyCode::Tab));
        assert_eq!(doc.active_element(), dialog.focusables().first().copied());

        doc.focus(paragraph);
        doc.dispatch_key(&KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT));
        assert_eq!(doc.active_element(), dialog.focusables().last().copied());
    }

    #[test]
    fn overlay_click_respects_phase_and_option() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler);
        dialog.open();
        let overlay = dialog.elements().unwrap().overlay;

        doc.click(overlay);
        assert_eq!(dialog.phase(), DialogPhase::Appearing);

        scheduler.advance(ms(150));
        doc.click(overlay);
        assert_eq!(dialog.phase(), DialogPhase::Disappearing);

        let blocked = Dialog::new(&doc, &scheduler)
            .options(&DialogOptions::new().click_outside_closes(false));
        blocked.open();
        scheduler.advance(ms(150));
        doc.click(blocked.elements().unwrap().overlay);
        assert_eq!(blocked.phase(), DialogPhase::Visible);
    }

    #[test]
    fn panel_clicks_do_not_reach_overlay() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        scheduler.advance(ms(150));
        let elements = dialog.elements().unwrap();
        let outcome = doc.click(elements.content);
        assert!(outcome.propagation_stopped);
        assert_eq!(dialog.phase(), DialogPhase::Visible);

        doc.click(elements.close_button.unwrap());
        assert_eq!(dialog.phase(), DialogPhase::Disappearing);
    }

    #[test]
    fn focus_returns_to_previous_element() {
        let (doc, scheduler) = setup();
        let trigger = doc.append(doc.root(), &Node::button("open")).unwrap();
        doc.focus(trigger);
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        assert_ne!(doc.active_element(), Some(trigger));
        dialog.force_close();
        assert_eq!(doc.active_element(), Some(trigger));

        dialog.set_options(&DialogOptions::new().restore_focus(false));
        dialog.open();
        dialog.force_close();
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn content_changes_apply_to_next_mount() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content("first");
        dialog.open();
        dialog.set_content("second");
        dialog.set_options(&DialogOptions::new().fade_duration_ms(10));
        let content = dialog.elements().unwrap().content;
        assert_eq!(doc.text_content(content), "first");
        assert_eq!(dialog.config().fade_duration_ms, 300);

        dialog.force_close();
        dialog.open();
        let content = dialog.elements().unwrap().content;
        assert_eq!(doc.text_content(content), "second");
        assert_eq!(dialog.config().fade_duration_ms, 10);
    }

    #[test]
    fn drop_cleans_up_everything() {
        let (doc, scheduler) = setup();
        let dialog = Dialog::new(&doc, &scheduler).content(form());
        dialog.open();
        drop(dialog);
        assert!(doc.is_empty());
        assert_eq!(doc.key_listener_count(), 0);
        assert_eq!(doc.click_handler_count(), 0);
        assert_eq!(scheduler.pending(), 0);
    }
}
