#![forbid(unsafe_code)]

//! Single-threaded runtime pieces shared by Veil widgets.
//!
//! - [`reactive`]: [`Observable`] values with RAII [`Subscription`]s.
//! - [`timer`]: the virtual-clock [`Scheduler`] and cancellable [`TimerGuard`]s.
//! - `logging` (feature `tracing-json`): global subscriber setup.

pub mod reactive;
pub mod timer;

#[cfg(feature = "tracing-json")]
pub mod logging;

pub use reactive::{Observable, Subscription};
pub use timer::{Scheduler, TimerGuard};
