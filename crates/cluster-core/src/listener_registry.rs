use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use cluster_types::NodeId;

/// Receives every peer "index created" notification the transport layer delivers.
///
/// Implementations filter by index themselves; the registry fans out unconditionally (§4.4).
/// Must be `Send + Sync`: invocation may happen concurrently from multiple transport threads.
pub trait NodeIndexCreatedListener: Send + Sync {
    fn on_node_index_created(&self, index_name: &str, node_id: NodeId);
}

/// A handle returned by [`ListenerRegistry::add`], used to deregister that exact registration
/// later without requiring the caller to keep the original `Arc` around for pointer equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationToken(u64);

/// A process-wide fan-out hub for peer "index created" notifications (C7, §4.4).
///
/// Registration and delivery are independent operations on a concurrent set: `add`/`remove`
/// never block on `notify`, and `notify` takes a read lock so concurrently-arriving
/// notifications fan out in parallel.
#[derive(Default)]
pub struct ListenerRegistry {
    next_token: AtomicU64,
    listeners: RwLock<Vec<(RegistrationToken, Arc<dyn NodeIndexCreatedListener>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self { next_token: AtomicU64::new(0), listeners: RwLock::new(Vec::new()) }
    }

    pub fn add(&self, listener: Arc<dyn NodeIndexCreatedListener>) -> RegistrationToken {
        let token = RegistrationToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push((token, listener));
        token
    }

    /// Removes a listener by its registration token. No-op if it was already removed (e.g. a
    /// tracker that just settled and deregistered itself).
    pub fn remove(&self, token: RegistrationToken) {
        let mut listeners = self.listeners.write().unwrap();
        listeners.retain(|(candidate, _)| *candidate != token);
    }

    /// Invoked by the transport layer whenever a peer reports that it has materialized an
    /// index locally. Every registered listener receives every notification.
    ///
    /// Snapshots the listener list and releases the read lock before dispatching: a listener
    /// is free to call back into `add`/`remove` from within `on_node_index_created` (e.g. an
    /// `AckTracker` deregistering itself on settlement) without deadlocking against its own
    /// notification.
    pub fn notify(&self, index_name: &str, node_id: NodeId) {
        let listeners: Vec<_> = self.listeners.read().unwrap().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener.on_node_index_created(index_name, node_id);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use super::*;

    struct CountingListener {
        count: AtomicUsize,
    }

    impl NodeIndexCreatedListener for CountingListener {
        fn on_node_index_created(&self, _index_name: &str, _node_id: NodeId) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn every_registered_listener_receives_every_notification() {
        let registry = ListenerRegistry::new();
        let listener = Arc::new(CountingListener { count: AtomicUsize::new(0) });
        registry.add(listener.clone() as Arc<dyn NodeIndexCreatedListener>);

        registry.notify("logs", NodeId::new());
        registry.notify("logs", NodeId::new());

        assert_eq!(listener.count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removed_listeners_stop_receiving_notifications() {
        let registry = ListenerRegistry::new();
        let listener = Arc::new(CountingListener { count: AtomicUsize::new(0) });
        let token = registry.add(listener.clone() as Arc<dyn NodeIndexCreatedListener>);
        registry.remove(token);

        registry.notify("logs", NodeId::new());

        assert_eq!(listener.count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    /// Mirrors what `AckTracker::settle` does on its own notification: deregister itself from
    /// the registry from inside `on_node_index_created`. This must not deadlock.
    struct SelfDeregisteringListener {
        registry: Arc<ListenerRegistry>,
        token: Mutex<Option<RegistrationToken>>,
        notified: AtomicUsize,
    }

    impl NodeIndexCreatedListener for SelfDeregisteringListener {
        fn on_node_index_created(&self, _index_name: &str, _node_id: NodeId) {
            self.notified.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = self.token.lock().unwrap().take() {
                self.registry.remove(token);
            }
        }
    }

    #[test]
    fn a_listener_may_deregister_itself_from_within_its_own_notification() {
        let registry = Arc::new(ListenerRegistry::new());
        let listener = Arc::new(SelfDeregisteringListener {
            registry: registry.clone(),
            token: Mutex::new(None),
            notified: AtomicUsize::new(0),
        });
        let token = registry.add(listener.clone() as Arc<dyn NodeIndexCreatedListener>);
        *listener.token.lock().unwrap() = Some(token);

        registry.notify("logs", NodeId::new());

        assert_eq!(listener.notified.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());

        // A second notification must not re-invoke the now-deregistered listener.
        registry.notify("logs", NodeId::new());
        assert_eq!(listener.notified.load(Ordering::SeqCst), 1);
    }
}
