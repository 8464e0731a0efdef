use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cluster_types::ClusterState;
use synchronoise::SignalEvent;
use tokio::sync::watch;

type Task = Box<dyn FnOnce(&ClusterState) -> ClusterState + Send>;
pub type CommittedHook = Box<dyn FnOnce(&ClusterState) + Send>;

struct QueuedTask {
    description: String,
    task: Task,
    on_committed: Option<CommittedHook>,
}

/// Serializes every mutation of cluster state behind a single dedicated worker thread (C4,
/// §4.1). A task is a pure function `ClusterState -> ClusterState`; tasks run one at a time in
/// submission order, and a task's returned state is published to local subscribers before the
/// next task starts.
///
/// The worker thread is woken by a `synchronoise::SignalEvent` rather than parked/unparked
/// directly, and every tick is wrapped in `catch_unwind` so a panicking task logs and is
/// skipped rather than taking the worker thread down — the same shape as the reference
/// stack's scheduler run-loop.
pub struct UpdateQueue {
    queue: Mutex<VecDeque<QueuedTask>>,
    wake_up: Arc<SignalEvent>,
    must_stop: Arc<AtomicBool>,
    state: watch::Sender<ClusterState>,
}

impl UpdateQueue {
    /// Builds the queue and spawns its dedicated worker thread.
    pub fn spawn(initial: ClusterState) -> Arc<Self> {
        let (state, _receiver) = watch::channel(initial);
        let queue = Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            wake_up: Arc::new(SignalEvent::manual(false)),
            must_stop: Arc::new(AtomicBool::new(false)),
            state,
        });

        let worker = queue.clone();
        std::thread::Builder::new()
            .name("cluster-state-queue".to_owned())
            .spawn(move || worker.run())
            .expect("failed to spawn the cluster-state update queue thread");

        queue
    }

    /// Enqueues an ordinary task with no post-commit hook.
    pub fn submit<F>(&self, description: impl Into<String>, task: F)
    where
        F: FnOnce(&ClusterState) -> ClusterState + Send + 'static,
    {
        self.submit_processed(description, task, None);
    }

    /// Enqueues a task carrying an `on_committed` hook, invoked after its returned state has
    /// been observed locally (§4.1, §4.7's routing-commit notification).
    pub fn submit_processed<F>(
        &self,
        description: impl Into<String>,
        task: F,
        on_committed: Option<CommittedHook>,
    ) where
        F: FnOnce(&ClusterState) -> ClusterState + Send + 'static,
    {
        let queued = QueuedTask { description: description.into(), task: Box::new(task), on_committed };
        self.queue.lock().unwrap().push_back(queued);
        self.wake_up.signal();
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> ClusterState {
        self.state.borrow().clone()
    }

    /// A `watch` receiver that observes every published snapshot, for local subscribers.
    pub fn subscribe(&self) -> watch::Receiver<ClusterState> {
        self.state.subscribe()
    }

    pub fn stop(&self) {
        self.must_stop.store(true, Ordering::SeqCst);
        self.wake_up.signal();
    }

    fn run(self: Arc<Self>) {
        loop {
            if self.must_stop.load(Ordering::SeqCst) {
                return;
            }
            match self.pop_task() {
                Some(queued) => self.run_one(queued),
                None => {
                    self.wake_up.wait();
                    self.wake_up.reset();
                }
            }
        }
    }

    fn pop_task(&self) -> Option<QueuedTask> {
        self.queue.lock().unwrap().pop_front()
    }

    fn run_one(&self, queued: QueuedTask) {
        let QueuedTask { description, task, on_committed } = queued;
        let previous = self.current();
        let result = catch_unwind(AssertUnwindSafe(|| task(&previous)));
        let next = match result {
            Ok(next) => next,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                tracing::error!(description = %description, reason, "a cluster-state task panicked, state left unchanged");
                return;
            }
        };
        if next != previous {
            let _ = self.state.send(next.clone());
        }
        if let Some(on_committed) = on_committed {
            on_committed(&next);
        }
    }
}
