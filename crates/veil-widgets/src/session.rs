#![forbid(unsafe_code)]

//! Dialog session provider: one shared dialog, many callers.
//!
//! A [`DialogProvider`] owns the session state (an [`Observable`]) and the
//! single [`Dialog`] bound to it. Any part of the application holding a
//! [`DialogHandle`] can open or close that dialog.
//!
//! # Opening
//!
//! `open` hard-resets first: a mounted dialog is force-closed (no fade-out)
//! and any open still waiting on its guard timer is cancelled. The new
//! content is applied after [`OPEN_GUARD_DELAY`]. Two opens inside that
//! window therefore mount only the second content.
//!
//! # Closing
//!
//! `close` cancels a pending open and clears the session state at once. The
//! widget keeps the content it mounted until its own fade-out completes.
//!
//! # Handles
//!
//! Handles are weak. A handle obtained outside any provider
//! ([`DialogHandle::detached`]) or outliving its provider turns `open` and
//! `close` into logged no-ops; `try_open`/`try_close` report
//! [`DialogError::NoProvider`] instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use veil_core::dom::{Document, Fragment};
use veil_runtime::reactive::{Observable, Subscription};
use veil_runtime::timer::{Scheduler, TimerGuard};
use web_time::Instant;

use crate::dialog::{Dialog, DialogConfig, DialogOptions, DialogPhase};

/// Wait between a hard reset and applying the new open request.
pub const OPEN_GUARD_DELAY: Duration = Duration::from_millis(10);

/// Session state observed by the dialog.
///
/// `content` is `Some` and `options` non-empty only while `open`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub open: bool,
    pub content: Option<Fragment>,
    pub options: DialogOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogError {
    /// The handle is not attached to a live provider.
    NoProvider,
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvider => f.write_str("no dialog provider is attached to this handle"),
        }
    }
}

impl std::error::Error for DialogError {}

struct ProviderShared {
    state: Observable<SessionState>,
    scheduler: Scheduler,
    dialog: Dialog,
    pending_open: RefCell<Option<TimerGuard>>,
    _binding: Subscription,
}

impl ProviderShared {
    fn open(self: &Rc<Self>, content: Fragment, options: DialogOptions) {
        if self.dialog.phase().is_mounted() {
            tracing::debug!(phase = ?self.dialog.phase(), "dialog.provider: hard reset before open");
            self.dialog.force_close();
        }
        self.state.set(SessionState::default());

        let weak = Rc::downgrade(self);
        let guard = self.scheduler.set_timeout(OPEN_GUARD_DELAY, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let fired = shared.pending_open.borrow_mut().take();
            drop(fired);
            shared.state.set(SessionState {
                open: true,
                content: Some(content),
                options,
            });
        });
        let previous = self.pending_open.borrow_mut().replace(guard);
        if previous.is_some() {
            tracing::debug!("dialog.provider: superseded a pending open");
        }
        drop(previous);
    }

    fn close(&self) {
        let pending = self.pending_open.borrow_mut().take();
        drop(pending);
        self.state.set(SessionState::default());
    }

    fn sync(&self, state: &SessionState) {
        if state.open {
            if let Some(content) = &state.content {
                self.dialog.set_content(content.clone());
            }
            self.dialog.set_options(&state.options);
            self.dialog.open();
        } else {
            self.dialog.close();
        }
    }
}

/// Owner of the session state and the one dialog bound to it.
///
/// Dropping the provider unmounts the dialog, cancels pending timers, and
/// detaches every handle.
pub struct DialogProvider {
    shared: Rc<ProviderShared>,
}

impl fmt::Debug for DialogProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogProvider")
            .field("state", &self.shared.state)
            .field("dialog", &self.shared.dialog)
            .field("open_pending", &self.is_open_pending())
            .finish()
    }
}

impl DialogProvider {
    /// Create a provider whose dialog renders into `doc`.
    #[must_use]
    pub fn new(doc: &Document, scheduler: &Scheduler) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<ProviderShared>| {
            let state = Observable::new(SessionState::default());

            let on_close = weak.clone();
            let dialog = Dialog::new(doc, scheduler).on_close(move || {
                if let Some(shared) = on_close.upgrade() {
                    shared.close();
                }
            });

            let bound = weak.clone();
            let binding = state.subscribe(move |state: &SessionState| {
                if let Some(shared) = bound.upgrade() {
                    shared.sync(state);
                }
            });

            ProviderShared {
                state,
                scheduler: scheduler.clone(),
                dialog,
                pending_open: RefCell::new(None),
                _binding: binding,
            }
        });
        Self { shared }
    }

    /// A handle for consumers. Handles are cheap to clone.
    #[must_use]
    pub fn handle(&self) -> DialogHandle {
        DialogHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Replace whatever is shown with `content`, after the guard delay.
    pub fn open(&self, content: impl Into<Fragment>, options: DialogOptions) {
        self.shared.open(content.into(), options);
    }

    pub fn close(&self) {
        self.shared.close();
    }

    /// Advance the scheduler to the wall-clock `now`.
    pub fn tick(&self, now: Instant) -> usize {
        self.shared.scheduler.advance_to_instant(now)
    }

    #[must_use]
    pub fn phase(&self) -> DialogPhase {
        self.shared.dialog.phase()
    }

    /// Whether the session state says open (the dialog may still be appearing).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.state.with(|state| state.open)
    }

    /// Whether an open is waiting on its guard timer.
    #[must_use]
    pub fn is_open_pending(&self) -> bool {
        self.shared.pending_open.borrow().is_some()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state.get()
    }

    /// Configuration the dialog currently renders with.
    #[must_use]
    pub fn config(&self) -> DialogConfig {
        self.shared.dialog.config()
    }

    /// Observe session state changes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&SessionState) + 'static) -> Subscription {
        self.shared.state.subscribe(callback)
    }

    #[must_use]
    pub fn dialog(&self) -> &Dialog {
        &self.shared.dialog
    }
}

impl Drop for DialogProvider {
    fn drop(&mut self) {
        let pending = self.shared.pending_open.borrow_mut().take();
        drop(pending);
        self.shared.dialog.force_close();
    }
}

/// Consumer-side access to a [`DialogProvider`].
#[derive(Clone, Default)]
pub struct DialogHandle {
    shared: Weak<ProviderShared>,
}

impl fmt::Debug for DialogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl DialogHandle {
    /// A handle bound to no provider.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Open `content`; a logged no-op when detached.
    pub fn open(&self, content: impl Into<Fragment>, options: DialogOptions) {
        if self.try_open(content, options).is_err() {
            tracing::warn!("dialog.handle: open ignored, no dialog provider attached");
        }
    }

    /// Close the dialog; a logged no-op when detached.
    pub fn close(&self) {
        if self.try_close().is_err() {
            tracing::warn!("dialog.handle: close ignored, no dialog provider attached");
        }
    }

    pub fn try_open(
        &self,
        content: impl Into<Fragment>,
        options: DialogOptions,
    ) -> Result<(), DialogError> {
        let shared = self.shared.upgrade().ok_or(DialogError::NoProvider)?;
        shared.open(content.into(), options);
        Ok(())
    }

    pub fn try_close(&self) -> Result<(), DialogError> {
        let shared = self.shared.upgrade().ok_or(DialogError::NoProvider)?;
        shared.close();
        Ok(())
    }
}
