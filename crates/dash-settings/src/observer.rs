//! Change observers
//!
//! Observers are plain callbacks run synchronously on every broadcast. The
//! list is snapshotted before calling out, so an observer may read the
//! client or drop its own subscription from inside the callback.

use crate::types::SettingChange;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Change callback
pub type Observer = Arc<dyn Fn(&SettingChange) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: AtomicU64,
    observers: Mutex<Vec<(u64, Observer)>>,
}

impl ObserverList {
    /// Register observer; an observer already present (same `Arc`) keeps its slot
    pub(crate) fn subscribe(self: &Arc<Self>, observer: Observer) -> Subscription {
        let mut observers = self.observers.lock();
        let id = match observers.iter().find(|(_, o)| Arc::ptr_eq(o, &observer)) {
            Some((id, _)) => *id,
            None => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                observers.push((id, observer));
                id
            }
        };
        Subscription {
            id,
            list: Arc::downgrade(self),
        }
    }

    pub(crate) fn notify(&self, change: &SettingChange) {
        let snapshot: Vec<Observer> = self
            .observers
            .lock()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();

        for observer in snapshot {
            observer(change);
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.observers.lock().iter().any(|(observer_id, _)| *observer_id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.lock().len()
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.len())
            .finish()
    }
}

/// Unregister token returned by `subscribe`
///
/// Dropping the token keeps the observer registered; call
/// [`Subscription::unsubscribe`] to stop notifications.
#[derive(Debug)]
#[must_use = "dropping the subscription does not unsubscribe; keep it to call unsubscribe()"]
pub struct Subscription {
    id: u64,
    list: Weak<ObserverList>,
}

impl Subscription {
    /// Stop notifications to this observer
    ///
    /// Returns `false` if it was already removed or the client is gone.
    pub fn unsubscribe(self) -> bool {
        self.list.upgrade().is_some_and(|list| list.remove(self.id))
    }

    /// Whether the observer still receives notifications
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.list.upgrade().is_some_and(|list| list.contains(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn change() -> SettingChange {
        SettingChange {
            key: "a".to_string(),
            new_value: json!(2),
            old_value: json!(1),
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Observer) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let observer: Observer = Arc::new(move |_: &SettingChange| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, observer)
    }

    #[test]
    fn notify_reaches_all_observers() {
        let list = Arc::new(ObserverList::default());
        let (a, observer_a) = counter();
        let (b, observer_b) = counter();
        let _sub_a = list.subscribe(observer_a);
        let _sub_b = list.subscribe(observer_b);

        list.notify(&change());

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn same_observer_registered_once() {
        let list = Arc::new(ObserverList::default());
        let (count, observer) = counter();
        let _first = list.subscribe(Arc::clone(&observer));
        let _second = list.subscribe(observer);

        list.notify(&change());
        assert_eq!(list.len(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_only_affects_one_observer() {
        let list = Arc::new(ObserverList::default());
        let (a, observer_a) = counter();
        let (b, observer_b) = counter();
        let sub_a = list.subscribe(observer_a);
        let sub_b = list.subscribe(observer_b);

        assert!(sub_a.unsubscribe());
        list.notify(&change());

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert!(sub_b.is_active());
    }

    #[test]
    fn unsubscribe_after_list_dropped() {
        let list = Arc::new(ObserverList::default());
        let (_, observer) = counter();
        let sub = list.subscribe(observer);
        drop(list);

        assert!(!sub.is_active());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn observer_can_unsubscribe_itself() {
        let list = Arc::new(ObserverList::default());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_inner = Arc::clone(&slot);
        let sub = list.subscribe(Arc::new(move |_: &SettingChange| {
            if let Some(sub) = slot_inner.lock().take() {
                sub.unsubscribe();
            }
        }));
        *slot.lock() = Some(sub);

        list.notify(&change());
        assert_eq!(list.len(), 0);
    }
}
