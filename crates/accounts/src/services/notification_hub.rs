//! Pending-count aggregation and fan-out.
//!
//! The hub is an explicitly constructed, injectable instance (never a
//! process-wide singleton) so tests can run against isolated hubs. Counts
//! never go negative; decrements saturate at zero.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Category → pending count.
pub type NotificationCounts = HashMap<String, u64>;

type Subscriber = Arc<dyn Fn(&NotificationCounts) + Send + Sync>;

struct HubInner {
    counts: NotificationCounts,
    subscribers: Vec<(u64, Subscriber)>,
    next_id: u64,
    disposed: bool,
}

/// Aggregates pending-item counts and notifies subscribers on every change.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<Mutex<HubInner>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                counts: NotificationCounts::new(),
                subscribers: Vec::new(),
                next_id: 1,
                disposed: false,
            })),
        }
    }

    /// Register a callback invoked with the full count map on every change.
    ///
    /// The returned handle deregisters exactly this callback; dropping it
    /// without calling [`Subscription::unsubscribe`] leaves the callback
    /// registered for the hub's lifetime.
    pub fn subscribe(
        &self,
        callback: impl Fn(&NotificationCounts) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        if !inner.disposed {
            inner.subscribers.push((id, Arc::new(callback)));
        }
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Merge a partial count map and notify every current subscriber.
    pub fn update_counts(&self, partial: NotificationCounts) {
        self.mutate(move |counts| {
            for (category, count) in partial {
                counts.insert(category, count);
            }
        });
    }

    pub fn increment_count(&self, category: &str, n: u64) {
        let category = category.to_owned();
        self.mutate(move |counts| {
            let entry = counts.entry(category).or_insert(0);
            *entry = entry.saturating_add(n);
        });
    }

    /// Decrement a category, flooring at zero.
    pub fn decrement_count(&self, category: &str, n: u64) {
        let category = category.to_owned();
        self.mutate(move |counts| {
            let entry = counts.entry(category).or_insert(0);
            *entry = entry.saturating_sub(n);
        });
    }

    /// Set a category back to zero.
    pub fn mark_as_read(&self, category: &str) {
        let category = category.to_owned();
        self.mutate(move |counts| {
            counts.insert(category, 0);
        });
    }

    /// Drop all categories and notify subscribers with the empty map.
    pub fn reset_counts(&self) {
        self.mutate(|counts| counts.clear());
    }

    pub fn counts(&self) -> NotificationCounts {
        self.lock().counts.clone()
    }

    pub fn count(&self, category: &str) -> u64 {
        self.lock().counts.get(category).copied().unwrap_or(0)
    }

    /// Tear the hub down: clears counts and subscribers. A disposed hub
    /// accepts no new subscribers and delivers nothing.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.disposed = true;
        inner.counts.clear();
        inner.subscribers.clear();
    }

    /// Apply a mutation, then dispatch to a snapshot of the subscriber
    /// list. The lock is released before callbacks run, so a callback may
    /// subscribe or unsubscribe without affecting the in-flight delivery.
    fn mutate(&self, apply: impl FnOnce(&mut NotificationCounts)) {
        let (snapshot, subscribers) = {
            let mut inner = self.lock();
            if inner.disposed {
                return;
            }
            apply(&mut inner.counts);
            let subscribers: Vec<Subscriber> = inner
                .subscribers
                .iter()
                .map(|(_, subscriber)| subscriber.clone())
                .collect();
            (inner.counts.clone(), subscribers)
        };

        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().expect("notification hub lock poisoned")
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`NotificationHub::subscribe`].
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Subscription {
    /// Deregister the callback this handle was created for.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.lock().expect("notification hub lock poisoned");
            let id = self.id;
            inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_update_counts_notifies_with_full_map() {
        let hub = NotificationHub::new();
        let seen: Arc<Mutex<Vec<NotificationCounts>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _subscription = hub.subscribe(move |counts| {
            sink.lock().unwrap().push(counts.clone());
        });

        hub.update_counts(NotificationCounts::from([(
            "artisan_applications".to_string(),
            3,
        )]));
        hub.update_counts(NotificationCounts::from([(
            "home_owner_applications".to_string(),
            1,
        )]));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        // second delivery carries the merged map
        assert_eq!(seen[1].get("artisan_applications"), Some(&3));
        assert_eq!(seen[1].get("home_owner_applications"), Some(&1));
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let hub = NotificationHub::new();
        hub.update_counts(NotificationCounts::from([("reports".to_string(), 2)]));

        hub.decrement_count("reports", 5);

        assert_eq!(hub.count("reports"), 0);
    }

    #[test]
    fn test_decrement_of_unknown_category_stays_zero() {
        let hub = NotificationHub::new();
        hub.decrement_count("missing", 1);
        assert_eq!(hub.count("missing"), 0);
    }

    #[test]
    fn test_increment_and_mark_as_read() {
        let hub = NotificationHub::new();

        hub.increment_count("verifications", 1);
        hub.increment_count("verifications", 2);
        assert_eq!(hub.count("verifications"), 3);

        hub.mark_as_read("verifications");
        assert_eq!(hub.count("verifications"), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery_for_that_callback_only() {
        let hub = NotificationHub::new();
        let first_calls = Arc::new(AtomicU64::new(0));
        let second_calls = Arc::new(AtomicU64::new(0));

        let counter = first_calls.clone();
        let first = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = second_calls.clone();
        let _second = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.increment_count("reports", 1);
        first.unsubscribe();
        hub.increment_count("reports", 1);
        hub.increment_count("reports", 1);

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_reentrant_subscribe_does_not_deadlock_or_join_inflight_delivery() {
        let hub = NotificationHub::new();
        let nested_calls = Arc::new(AtomicU64::new(0));

        let reentrant_hub = hub.clone();
        let nested = nested_calls.clone();
        let _outer = hub.subscribe(move |_| {
            let nested = nested.clone();
            // registering from inside a callback must not affect this delivery
            let subscription = reentrant_hub.subscribe(move |_| {
                nested.fetch_add(1, Ordering::SeqCst);
            });
            subscription.unsubscribe();
        });

        hub.increment_count("reports", 1);

        assert_eq!(nested_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reset_counts_clears_everything() {
        let hub = NotificationHub::new();
        hub.increment_count("a", 2);
        hub.increment_count("b", 4);

        hub.reset_counts();

        assert!(hub.counts().is_empty());
    }

    #[test]
    fn test_disposed_hub_is_inert() {
        let hub = NotificationHub::new();
        let calls = Arc::new(AtomicU64::new(0));

        let counter = calls.clone();
        let _subscription = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.increment_count("reports", 1);
        hub.dispose();
        hub.increment_count("reports", 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(hub.count("reports"), 0);
    }
}
