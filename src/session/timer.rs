use crate::event::{EventSender, Notification};
use crate::log_info;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::io;
use std::thread;
use std::time::Duration;

/// Spinner frame length while items are loading.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Posts `ForceRedraw` on a fixed interval until stopped or dropped.
pub struct RedrawTimer {
    stop: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RedrawTimer {
    pub fn start(notes: EventSender<Notification>, interval: Duration) -> io::Result<Self> {
        let (stop, stopped) = bounded::<()>(1);
        let thread = thread::Builder::new()
            .name("redraw-timer".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !notes.send(Notification::ForceRedraw) {
                            return;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log_info("redraw timer thread panicked");
            }
        }
    }
}

impl Drop for RedrawTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
