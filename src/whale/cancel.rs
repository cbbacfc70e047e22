use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, Instant};

/// Caller side of monitor cancellation.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
            deadline: None,
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Monitor side of cancellation, observed at every ledger call.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            deadline: None,
        }
    }

    /// Also fires once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    pub fn is_cancelled(&self) -> bool {
        let flagged = self.rx.as_ref().map_or(false, |rx| *rx.borrow());
        let expired = self.deadline.map_or(false, |d| Instant::now() >= d);
        flagged || expired
    }

    /// Resolves once the signal fires.
    pub async fn cancelled(&mut self) {
        let deadline = self.deadline;
        let flag = wait_for_flag(self.rx.as_mut());
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = flag => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => flag.await,
        }
    }

    /// Runs `fut` unless the signal fires first, in which case `fut` is dropped
    /// and `None` is returned.
    pub async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

async fn wait_for_flag(rx: Option<&mut watch::Receiver<bool>>) {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling.
            return std::future::pending().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guard_returns_output_when_not_cancelled() {
        let handle = CancelHandle::new();
        let mut signal = handle.signal();
        assert_eq!(signal.guard(async { 5 }).await, Some(5));
    }

    #[tokio::test]
    async fn guard_drops_future_after_cancel() {
        let handle = CancelHandle::new();
        let mut signal = handle.signal();
        handle.cancel();

        assert!(signal.is_cancelled());
        assert_eq!(signal.guard(std::future::pending::<()>()).await, None);
        // Stays cancelled on later calls.
        assert_eq!(signal.guard(async { 1 }).await, None);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_call() {
        let handle = CancelHandle::new();
        let mut signal = handle.signal();

        let canceller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        assert_eq!(signal.guard(std::future::pending::<()>()).await, None);
    }

    #[tokio::test]
    async fn timeout_acts_as_cancellation() {
        let mut signal = CancelSignal::never().with_timeout(Duration::from_millis(5));
        assert_eq!(signal.guard(std::future::pending::<()>()).await, None);
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn never_signal_runs_to_completion() {
        let mut signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        assert_eq!(signal.guard(async { "done" }).await, Some("done"));
    }
}
