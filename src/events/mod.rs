//! # Events Module
//!
//! Observer-based progress reporting for the pipeline.
//!
//! Observers are notified synchronously on the thread that changed the
//! counters. The registry iterates a snapshot of the observer list, so
//! concurrent registration or removal can never corrupt an in-progress
//! notification. A slow observer delays the notifying thread; consumers
//! that need decoupling should register a [`ChannelObserver`] and drain
//! the channel on their own thread.

mod channel;

pub use channel::{ChannelObserver, ProgressReceiver};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// A listener notified whenever the pipeline's progress counters change.
pub trait ProgressObserver: Send + Sync {
    /// Called with the counter values as they stood at the moment of the
    /// mutation that triggered this notification.
    fn on_progress(&self, processed: usize, total: usize);
}

/// A progress snapshot, suitable for forwarding over channels or to a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Items whose job has finished (success or failure)
    pub processed: usize,
    /// Items ever submitted since the last clear
    pub total: usize,
}

/// Holds registered progress observers and owns iteration during
/// notification.
///
/// The list is kept behind a mutex; `notify` clones the current list and
/// calls observers outside the lock, so observers may themselves register
/// or remove observers without deadlocking.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn ProgressObserver>>>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer. The same handle can later be passed to
    /// [`ObserverRegistry::remove`].
    pub fn add(&self, observer: Arc<dyn ProgressObserver>) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(observer);
        }
    }

    /// Remove a previously registered observer by handle identity.
    ///
    /// Returns true if the observer was found and removed.
    pub fn remove(&self, observer: &Arc<dyn ProgressObserver>) -> bool {
        if let Ok(mut observers) = self.observers.lock() {
            let before = observers.len();
            observers.retain(|o| !Arc::ptr_eq(o, observer));
            return observers.len() < before;
        }
        false
    }

    /// Number of currently registered observers
    pub fn len(&self) -> usize {
        self.observers.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every registered observer, synchronously, on the calling
    /// thread.
    pub fn notify(&self, processed: usize, total: usize) {
        let snapshot: Vec<Arc<dyn ProgressObserver>> = match self.observers.lock() {
            Ok(observers) => observers.clone(),
            Err(_) => return,
        };

        for observer in snapshot {
            observer.on_progress(processed, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        calls: AtomicUsize,
        last_total: AtomicUsize,
    }

    impl CountingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_total: AtomicUsize::new(0),
            })
        }
    }

    impl ProgressObserver for CountingObserver {
        fn on_progress(&self, _processed: usize, total: usize) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_total.store(total, Ordering::SeqCst);
        }
    }

    #[test]
    fn notify_reaches_all_observers() {
        let registry = ObserverRegistry::new();
        let first = CountingObserver::new();
        let second = CountingObserver::new();

        registry.add(first.clone());
        registry.add(second.clone());
        registry.notify(5, 10);

        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.last_total.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn removed_observer_is_not_notified() {
        let registry = ObserverRegistry::new();
        let observer = CountingObserver::new();
        let handle: Arc<dyn ProgressObserver> = observer.clone();

        registry.add(handle.clone());
        assert!(registry.remove(&handle));
        registry.notify(1, 1);

        assert_eq!(observer.calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_unknown_observer_returns_false() {
        let registry = ObserverRegistry::new();
        let handle: Arc<dyn ProgressObserver> = CountingObserver::new();
        assert!(!registry.remove(&handle));
    }

    struct SelfRemovingObserver {
        registry: Arc<ObserverRegistry>,
        extra: Arc<dyn ProgressObserver>,
    }

    impl ProgressObserver for SelfRemovingObserver {
        fn on_progress(&self, _processed: usize, _total: usize) {
            // Mutating the registry during notification must not deadlock
            // or corrupt iteration.
            self.registry.remove(&self.extra);
        }
    }

    #[test]
    fn observer_may_mutate_registry_during_notification() {
        let registry = Arc::new(ObserverRegistry::new());
        let extra: Arc<dyn ProgressObserver> = CountingObserver::new();
        registry.add(extra.clone());
        registry.add(Arc::new(SelfRemovingObserver {
            registry: registry.clone(),
            extra: extra.clone(),
        }));

        registry.notify(0, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn progress_update_is_serializable() {
        let update = ProgressUpdate {
            processed: 7,
            total: 25,
        };

        let json = serde_json::to_string(&update).unwrap();
        let deserialized: ProgressUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, update);
    }
}
