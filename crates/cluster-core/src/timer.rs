use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Schedules a one-shot callback at `now + d`, supporting cancellation (C1).
///
/// Built on top of `tokio::time::sleep` inside a dedicated task per armed timer rather than a
/// shared timer wheel, appropriate at the concurrency scale of one timer per in-flight
/// create-index operation (§9, expansion resolution). The cluster-state queue's worker runs on
/// a plain OS thread (§4.1), not inside a tokio runtime, so arming always goes through an
/// explicit `Handle` rather than `tokio::spawn`.
pub struct Timer {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Timer {
    /// Arms a timer that invokes `on_fire` after `delay`, unless cancelled first. `on_fire`
    /// runs as a task on `runtime`.
    pub fn arm<F>(runtime: &Handle, delay: time::Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let sleep_for = std::time::Duration::from_millis(delay.whole_milliseconds().max(0) as u64);
        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {
                    on_fire();
                }
                _ = cancel_rx => {}
            }
        });
        Self { cancel: Some(cancel_tx), handle }
    }

    /// Cancels the timer if it has not already fired. Dropping the sender completes the
    /// `cancel_rx` branch of the armed task's `select!`, which is how cancellation is
    /// delivered even if this `Timer` itself is dropped without an explicit call.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}
