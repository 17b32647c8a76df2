#![forbid(unsafe_code)]

//! Input events and the DOM-like document model for Veil.

pub mod dom;
pub mod event;

pub use dom::{Document, ElementId, Fragment, Node, Tag};
pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
