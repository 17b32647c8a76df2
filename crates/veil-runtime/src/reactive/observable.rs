#![forbid(unsafe_code)]

//! Shared, version-tracked values with change notification.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Callback<T>(Box<dyn Fn(&T)>);

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared value whose mutations notify subscribers.
///
/// Cloning an `Observable` clones the handle, not the value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not mutate this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value. Equal values are a no-op: no version bump, no notification.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place; notifies only if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Monotonic counter, bumped once per effective mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback` for future changes. Dropping the returned
    /// [`Subscription`] unsubscribes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong = Rc::new(Callback(Box::new(callback)));
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription { _strong: strong }
    }

    /// Live subscriber count (dropped subscriptions are excluded).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        let (callbacks, value) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (callbacks, inner.value.clone())
        };
        for callback in callbacks {
            (callback.0)(&value);
        }
    }
}

/// RAII guard for an [`Observable`] subscription.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _strong: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_bumps_version_and_notifies() {
        let obs = Observable::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| log.borrow_mut().push(*v));

        obs.set(2);
        obs.set(3);
        assert_eq!(obs.version(), 2);
        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn equal_set_is_noop() {
        let obs = Observable::new("a".to_string());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| counter.set(counter.get() + 1));
        obs.set("a".to_string());
        assert_eq!(obs.version(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let sub = obs.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        assert_eq!(obs.subscriber_count(), 0);
        obs.set(5);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let obs = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&order);
        let _first = obs.subscribe(move |_| a.borrow_mut().push("first"));
        let b = Rc::clone(&order);
        let _second = obs.subscribe(move |_| b.borrow_mut().push("second"));
        obs.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn subscriber_may_read_and_write_reentrantly() {
        let obs = Observable::new(0);
        let handle = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                handle.set(handle.get() + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn update_mutates_in_place() {
        let obs = Observable::new(vec![1, 2]);
        obs.update(|v| v.push(3));
        assert_eq!(obs.get(), vec![1, 2, 3]);
        obs.update(|_| {});
        assert_eq!(obs.version(), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn version_counts_effective_changes(
                start in 0u8..4,
                values in prop::collection::vec(0u8..4, 0..32),
            ) {
                let obs = Observable::new(start);
                let notified = Rc::new(RefCell::new(Vec::new()));
                let log = Rc::clone(&notified);
                let _sub = obs.subscribe(move |v| log.borrow_mut().push(*v));

                let mut previous = start;
                let mut changes = Vec::new();
                for value in values {
                    let before = obs.version();
                    obs.set(value);
                    prop_assert!(obs.version() >= before);
                    if value != previous {
                        changes.push(value);
                        previous = value;
                    }
                }
                prop_assert_eq!(obs.version(), changes.len() as u64);
                prop_assert_eq!(&*notified.borrow(), &changes);
                prop_assert_eq!(obs.get(), previous);
            }
        }
    }
}
