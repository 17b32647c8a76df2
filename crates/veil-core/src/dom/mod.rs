#![forbid(unsafe_code)]

//! DOM-like retained element tree.
//!
//! - [`Node`] / [`Fragment`]: detached, declarative content descriptions.
//! - [`Document`]: the live tree, with focus, keydown listeners, and click bubbling.
//! - [`focus`]: the focusable / tabbable matching rules.

mod document;
pub mod focus;
mod node;

pub use document::{
    ClickDispatch, ClickHandler, DispatchOutcome, Document, ElementId, KeyDispatch, KeyListener,
    ListenerGuard, ListenerId,
};
pub use node::{Fragment, Node, Tag};
