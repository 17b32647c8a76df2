#![forbid(unsafe_code)]

//! Observable values for widget state.
//!
//! An [`Observable`] is a cloneable handle to one value; every clone sees
//! the same value and version. Widgets bind to it with
//! [`Observable::subscribe`] and stay bound for as long as they hold the
//! returned [`Subscription`].
//!
//! Callbacks are kept as `Weak` references inside the observable, so the
//! subscription alone keeps them alive. Dead entries are pruned on the next
//! notification.
//!
//! # Invariants
//!
//! 1. The version moves by exactly one for each effective change.
//! 2. Notification order is subscription order.
//! 3. An equal value changes nothing and notifies no one.
//! 4. A dropped subscription is never called again.
//! 5. Callbacks run with no internal borrow held, so they may read or set the
//!    observable that is notifying them.

mod observable;

pub use observable::{Observable, Subscription};
