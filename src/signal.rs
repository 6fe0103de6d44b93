//! Single-assignment reply signal.
//!
//! Bridges a reply listener running on the connection's event path with a
//! caller awaiting the outcome. The sender half lives in the listener, the
//! receiver half with the caller:
//!
//! ```
//! use slirc_presence::signal::signal;
//!
//! let (tx, rx) = signal::<u32, String>();
//! assert!(tx.complete(7));
//! assert!(!tx.fail("too late".into()));
//! assert!(rx.is_done());
//! ```
//!
//! Only the first `complete`/`fail`/`finish` call has any effect; later calls
//! return `false`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

/// Why waiting on a signal ended without an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("no outcome within {0:?}")]
    Timeout(Duration),

    #[error("sender dropped without completing")]
    Abandoned,
}

/// Create a connected sender/receiver pair.
pub fn signal<T, E>() -> (SignalSender<T, E>, SignalReceiver<T, E>) {
    let (tx, rx) = oneshot::channel();
    let done = Arc::new(AtomicBool::new(false));
    (
        SignalSender {
            slot: Mutex::new(Some(tx)),
            done: Arc::clone(&done),
        },
        SignalReceiver { rx, done },
    )
}

/// Completing half, held by the reply listener.
pub struct SignalSender<T, E> {
    slot: Mutex<Option<oneshot::Sender<Result<T, E>>>>,
    done: Arc<AtomicBool>,
}

impl<T, E> SignalSender<T, E> {
    /// Complete with a value.
    pub fn complete(&self, value: T) -> bool {
        self.finish(Ok(value))
    }

    /// Complete with an error.
    pub fn fail(&self, error: E) -> bool {
        self.finish(Err(error))
    }

    /// Complete with an outcome. Returns `false` if already completed.
    pub fn finish(&self, outcome: Result<T, E>) -> bool {
        let Some(tx) = self.slot.lock().take() else {
            return false;
        };
        self.done.store(true, Ordering::Release);
        // A receiver that gave up (timeout) is not an error for the sender.
        let _ = tx.send(outcome);
        true
    }

    /// Whether an outcome has been set.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Waiting half, held by the caller.
pub struct SignalReceiver<T, E> {
    rx: oneshot::Receiver<Result<T, E>>,
    done: Arc<AtomicBool>,
}

impl<T, E> SignalReceiver<T, E> {
    /// Whether an outcome has been set.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Wait for the outcome.
    ///
    /// `None` waits indefinitely.
    pub async fn wait(self, timeout: Option<Duration>) -> Result<Result<T, E>, WaitError> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.rx)
                .await
                .map_err(|_| WaitError::Timeout(limit))?,
            None => self.rx.await,
        };
        received.map_err(|_| WaitError::Abandoned)
    }
}
