#![forbid(unsafe_code)]

//! Veil public facade.
//!
//! Animated, accessible modal dialogs for a retained, DOM-like document,
//! plus a session provider so any part of an application can open or close
//! the one shared dialog.
//!
//! # Quick start
//!
//! ```
//! use std::time::Duration;
//! use veil::prelude::*;
//!
//! let doc = Document::new();
//! let scheduler = Scheduler::new();
//! let provider = DialogProvider::new(&doc, &scheduler);
//!
//! let handle = provider.handle();
//! handle.open(Node::paragraph("Changes saved."), DialogOptions::new().fade_duration_ms(200));
//!
//! scheduler.run_until_idle();
//! assert_eq!(provider.phase(), DialogPhase::Visible);
//!
//! doc.dispatch_key(&KeyEvent::new(KeyCode::Escape));
//! scheduler.advance(Duration::from_millis(200));
//! assert_eq!(provider.phase(), DialogPhase::Closed);
//! ```

pub use veil_core as document;
pub use veil_runtime as runtime;
pub use veil_style as style;
pub use veil_widgets as widgets;

pub use veil_core::{Document, ElementId, Event, Fragment, KeyCode, KeyEvent, Modifiers, Node, Tag};
pub use veil_runtime::{Observable, Scheduler, Subscription, TimerGuard};
pub use veil_style::{Color, InlineStyle, Length};
pub use veil_widgets::{
    ConfigError, Dialog, DialogConfig, DialogError, DialogHandle, DialogOptions, DialogPhase,
    DialogProvider, SessionState,
};

/// Everything needed to build and drive dialogs.
pub mod prelude {
    pub use crate::{
        Color, Dialog, DialogConfig, DialogHandle, DialogOptions, DialogPhase, DialogProvider,
        Document, Fragment, KeyCode, KeyEvent, Length, Modifiers, Node, Scheduler,
    };
}
