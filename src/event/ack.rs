use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AckError {
    #[error("ack handle dropped without being signaled")]
    Dropped,
}

/// Create the two halves of a one-shot acknowledgement.
///
/// The producer keeps the [`AckWaiter`] and hands the [`AckHandle`] to the
/// consumer along with the event.
pub fn ack_pair() -> (AckHandle, AckWaiter) {
    let (tx, rx) = bounded(1);
    (AckHandle { tx }, AckWaiter { rx })
}

/// Consumer half. Signaling consumes it, so it can fire at most once.
#[derive(Debug)]
pub struct AckHandle {
    tx: Sender<()>,
}

impl AckHandle {
    pub fn signal(self) {
        let _ = self.tx.send(());
    }
}

/// Producer half.
#[derive(Debug)]
pub struct AckWaiter {
    rx: Receiver<()>,
}

impl AckWaiter {
    /// Block until the handle is signaled, or fail if it was dropped unsignaled.
    pub fn wait(self) -> Result<(), AckError> {
        self.rx.recv().map_err(|_| AckError::Dropped)
    }

    /// Bounded wait; `Ok(false)` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool, AckError> {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Ok(true),
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(AckError::Dropped),
        }
    }
}
