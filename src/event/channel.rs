use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The consumer took from a channel whose wait handle was not ready.
    #[error("event channel is empty")]
    Empty,
    #[error("event channel is disconnected")]
    Disconnected,
}

/// Multi-producer, single-consumer FIFO mailbox.
///
/// The channel keeps one sender of its own, so producers may come and go
/// without the consumer ever observing a disconnect. Readiness is the
/// receiver itself, which plugs into [`crossbeam_channel::Select`].
pub struct EventChannel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Producer handle; clone freely across threads.
    pub fn sender(&self) -> EventSender<T> {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn send(&self, item: T) {
        // The channel owns its receiver, so this cannot disconnect.
        let _ = self.tx.send(item);
    }

    pub fn try_recv(&self) -> Result<T, ChannelError> {
        self.rx.try_recv().map_err(|err| match err {
            TryRecvError::Empty => ChannelError::Empty,
            TryRecvError::Disconnected => ChannelError::Disconnected,
        })
    }

    /// Take the head item after a multiplexed wait reported this channel ready.
    ///
    /// # Panics
    ///
    /// Panics when the channel is empty: the wait invariant was broken.
    pub fn take(&self) -> T {
        match self.try_recv() {
            Ok(item) => item,
            Err(err) => panic!("{err}: take() called on a channel that was not ready"),
        }
    }

    /// Block until an item arrives.
    pub fn recv(&self) -> Result<T, ChannelError> {
        self.rx.recv().map_err(|_| ChannelError::Disconnected)
    }

    /// Readiness handle for a multi-channel `Select`.
    pub fn wait_handle(&self) -> &Receiver<T> {
        &self.rx
    }

    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSender<T> {
    tx: Sender<T>,
}

impl<T> EventSender<T> {
    /// Returns `false` once the owning channel is gone.
    pub fn send(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for EventSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("queued", &self.tx.len())
            .finish()
    }
}
