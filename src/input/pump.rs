use super::decoder::{ByteSource, KeyDecoder};
use super::key::KeyPress;
use crate::event::{ack_pair, AckError, AckHandle, EventSender, Notification};
use crate::log_info;
use std::io;
use std::thread;

/// A keypress together with the ack that re-arms the pump.
#[derive(Debug)]
pub struct KeyEvent {
    pub key: KeyPress,
    pub ack: AckHandle,
}

/// Anything that can produce one keypress per call.
pub trait KeySource: Send {
    fn next_key(&mut self) -> io::Result<KeyPress>;
}

impl<S: ByteSource + Send> KeySource for KeyDecoder<S> {
    fn next_key(&mut self) -> io::Result<KeyPress> {
        KeyDecoder::next_key(self)
    }
}

/// Start the `keyboard` thread.
///
/// Exactly one keypress is outstanding at a time: the next read only starts
/// after the consumer signals the previous event's ack.
pub fn spawn_keyboard_thread<K>(
    source: K,
    keys: EventSender<KeyEvent>,
    notes: EventSender<Notification>,
) -> io::Result<thread::JoinHandle<()>>
where
    K: KeySource + 'static,
{
    thread::Builder::new()
        .name("keyboard".to_string())
        .spawn(move || run_pump(source, &keys, &notes))
}

pub(crate) fn run_pump<K: KeySource>(
    mut source: K,
    keys: &EventSender<KeyEvent>,
    notes: &EventSender<Notification>,
) {
    loop {
        let key = match source.next_key() {
            Ok(key) => key,
            Err(err) => {
                log_info(&format!("keyboard read failed: {err}"));
                notes.send(Notification::FatalError {
                    message: format!("keyboard read failed: {err}"),
                });
                return;
            }
        };
        let (ack, waiter) = ack_pair();
        if !keys.send(KeyEvent { key, ack }) {
            return;
        }
        match waiter.wait() {
            Ok(()) => {}
            Err(AckError::Dropped) => {
                log_info("keyboard ack dropped; pump stopping");
                return;
            }
        }
    }
}
