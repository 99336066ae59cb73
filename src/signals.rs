//! Async signals turned into acknowledged events.
//!
//! A dedicated `signals` thread receives each delivery, hands it to the
//! controller, and blocks until the controller acks. Only then does the
//! signal's default disposition run (or not, for cancelled signals).
//!
//! If the controller exits without acking, the `signals` thread stays
//! blocked on that ack until the process ends.

use crate::event::{ack_pair, AckError, AckHandle, EventSender};
use crate::log_info;
use signal_hook::consts::signal::{SIGCONT, SIGINT, SIGQUIT, SIGTERM, SIGTSTP, SIGWINCH};
use signal_hook::iterator::{Handle, Signals};
use std::io;
use std::os::raw::c_int;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Winch,
    Int,
    Term,
    Tstp,
    Cont,
    Quit,
}

impl SignalKind {
    pub const ALL: [SignalKind; 6] = [
        SignalKind::Winch,
        SignalKind::Int,
        SignalKind::Term,
        SignalKind::Tstp,
        SignalKind::Cont,
        SignalKind::Quit,
    ];

    pub fn raw(self) -> c_int {
        match self {
            Self::Winch => SIGWINCH,
            Self::Int => SIGINT,
            Self::Term => SIGTERM,
            Self::Tstp => SIGTSTP,
            Self::Cont => SIGCONT,
            Self::Quit => SIGQUIT,
        }
    }

    pub fn from_raw(raw: c_int) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.raw() == raw)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Winch => "SIGWINCH",
            Self::Int => "SIGINT",
            Self::Term => "SIGTERM",
            Self::Tstp => "SIGTSTP",
            Self::Cont => "SIGCONT",
            Self::Quit => "SIGQUIT",
        }
    }

    /// QUIT must not kill us and TSTP is replaced by cleanup plus self-stop.
    pub fn cancels_default(self) -> bool {
        matches!(self, Self::Quit | Self::Tstp)
    }

    /// Signals whose default action still has to be carried out after the ack.
    fn default_terminates(self) -> bool {
        matches!(self, Self::Int | Self::Term)
    }
}

/// One delivery awaiting the controller's ack.
#[derive(Debug)]
pub struct SignalEvent {
    pub kind: SignalKind,
    pub ack: AckHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Acked; the default disposition proceeds.
    Proceed,
    /// Acked; the default disposition is suppressed.
    Cancelled,
    /// The controller dropped the ack (it is exiting) or the channel is gone.
    Abandoned,
}

/// Hand one signal to the controller and block until it is acknowledged.
pub(crate) fn deliver(kind: SignalKind, events: &EventSender<SignalEvent>) -> Delivery {
    let (ack, waiter) = ack_pair();
    tracing::info!(signal = kind.name(), "signal delivered");
    if !events.send(SignalEvent { kind, ack }) {
        return Delivery::Abandoned;
    }
    match waiter.wait() {
        Ok(()) => {
            tracing::info!(signal = kind.name(), "signal acked");
            if kind.cancels_default() {
                Delivery::Cancelled
            } else {
                Delivery::Proceed
            }
        }
        Err(AckError::Dropped) => {
            log_info(&format!("{} ack dropped; skipping default action", kind.name()));
            Delivery::Abandoned
        }
    }
}

fn run_default(kind: SignalKind) {
    if !kind.default_terminates() {
        return;
    }
    log_info(&format!("{} running default disposition", kind.name()));
    if let Err(err) = signal_hook::low_level::emulate_default_handler(kind.raw()) {
        log_info(&format!("{} default disposition failed: {err}", kind.name()));
    }
}

/// Owns the `signals` thread.
#[derive(Debug)]
pub struct SignalCoordinator {
    handle: Handle,
    thread: Option<thread::JoinHandle<()>>,
}

impl SignalCoordinator {
    /// Register every [`SignalKind`].
    pub fn install(events: EventSender<SignalEvent>) -> io::Result<Self> {
        Self::install_for(&SignalKind::ALL, events)
    }

    pub fn install_for(kinds: &[SignalKind], events: EventSender<SignalEvent>) -> io::Result<Self> {
        let raw: Vec<c_int> = kinds.iter().map(|kind| kind.raw()).collect();
        let mut signals = Signals::new(raw)?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                for raw in signals.forever() {
                    let Some(kind) = SignalKind::from_raw(raw) else {
                        continue;
                    };
                    if deliver(kind, &events) == Delivery::Proceed {
                        run_default(kind);
                    }
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalCoordinator {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
