#![forbid(unsafe_code)]

//! Dialog widget and dialog session provider for Veil.

pub mod dialog;
pub mod session;

pub use dialog::{
    ConfigError, Dialog, DialogConfig, DialogElements, DialogOptions, DialogPhase, TrapDecision,
};
pub use session::{DialogError, DialogHandle, DialogProvider, OPEN_GUARD_DELAY, SessionState};
