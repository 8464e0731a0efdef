use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use cluster_types::NodeId;
use tokio::runtime::Handle;

use crate::listener_registry::{ListenerRegistry, NodeIndexCreatedListener, RegistrationToken};
use crate::timer::Timer;

/// Collects per-node "index created" signals for one index and fires exactly once, at
/// quorum or on timeout (C5, §4.5).
///
/// The two settlement paths — the last expected acknowledgment arriving, and the timer
/// firing — race each other; `settled` is a single-bit compare-and-set latch that guarantees
/// only the first of them actually runs the callback, deregisters from the listener registry,
/// and cancels the other path.
pub struct AckTracker {
    target_index: String,
    remaining: AtomicI64,
    settled: AtomicBool,
    registry: Arc<ListenerRegistry>,
    token: Mutex<Option<RegistrationToken>>,
    timer: Mutex<Option<Timer>>,
    on_settle: Mutex<Option<Box<dyn FnOnce(bool) + Send>>>,
}

impl AckTracker {
    /// Constructs the tracker and, unless `expected_count <= 0`, registers it with `registry`
    /// and arms a timer for `timeout`. If `expected_count <= 0` (single-node cluster minus
    /// self), success fires synchronously and the timer is never armed (§4.5).
    pub fn spawn(
        runtime: &Handle,
        target_index: impl Into<String>,
        expected_count: i64,
        registry: Arc<ListenerRegistry>,
        timeout: time::Duration,
        on_settle: impl FnOnce(bool) + Send + 'static,
    ) -> Arc<Self> {
        let tracker = Arc::new(Self {
            target_index: target_index.into(),
            remaining: AtomicI64::new(expected_count),
            settled: AtomicBool::new(false),
            registry,
            token: Mutex::new(None),
            timer: Mutex::new(None),
            on_settle: Mutex::new(Some(Box::new(on_settle))),
        });

        if expected_count <= 0 {
            tracker.settle(true);
            return tracker;
        }

        let listener = tracker.clone() as Arc<dyn NodeIndexCreatedListener>;
        let token = tracker.registry.add(listener);
        *tracker.token.lock().unwrap() = Some(token);

        let timer_tracker = tracker.clone();
        let timer = Timer::arm(runtime, timeout, move || timer_tracker.settle(false));
        *tracker.timer.lock().unwrap() = Some(timer);

        tracker
    }

    fn settle(&self, acknowledged: bool) {
        if self.settled.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return;
        }
        if let Some(token) = self.token.lock().unwrap().take() {
            self.registry.remove(token);
        }
        if let Some(timer) = self.timer.lock().unwrap().take() {
            timer.cancel();
        }
        if let Some(on_settle) = self.on_settle.lock().unwrap().take() {
            on_settle(acknowledged);
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }
}

impl NodeIndexCreatedListener for AckTracker {
    fn on_node_index_created(&self, index_name: &str, _node_id: NodeId) {
        if index_name != self.target_index {
            return;
        }
        if self.settled.load(Ordering::SeqCst) {
            return;
        }
        let previous = self.remaining.fetch_sub(1, Ordering::SeqCst);
        if previous <= 1 {
            self.settle(true);
        }
    }
}
