use super::pump::run_pump;
use super::*;
use crate::event::{EventChannel, Notification};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Scripted bytes; `None` entries stand for an escape timeout.
struct Script {
    bytes: VecDeque<Option<u8>>,
}

impl Script {
    fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().map(Some).collect(),
        }
    }

    fn with_pause(mut self) -> Self {
        self.bytes.push_back(None);
        self
    }
}

impl ByteSource for Script {
    fn next_byte(&mut self) -> io::Result<u8> {
        loop {
            match self.bytes.pop_front() {
                Some(Some(byte)) => return Ok(byte),
                Some(None) => continue,
                None => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script done")),
            }
        }
    }

    fn try_next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.bytes.pop_front().flatten())
    }
}

fn decode_all(bytes: &[u8]) -> Vec<KeyPress> {
    let mut decoder = KeyDecoder::new(Script::new(bytes));
    let mut keys = Vec::new();
    while let Ok(key) = decoder.next_key() {
        keys.push(key);
    }
    keys
}

fn decode_one(bytes: &[u8]) -> KeyPress {
    let mut decoder = KeyDecoder::new(Script::new(bytes));
    decoder.next_key().unwrap()
}

#[test]
fn csi_up_arrow() {
    assert_eq!(decode_one(b"\x1b\x5b\x41"), KeyPress::code(KeyCode::Up));
}

#[test]
fn two_byte_utf8_scalar() {
    assert_eq!(decode_one(&[0xc3, 0xa9]), KeyPress::char('é'));
}

#[test]
fn four_byte_utf8_scalar() {
    assert_eq!(decode_one("🦀".as_bytes()), KeyPress::char('🦀'));
}

#[test]
fn malformed_utf8_becomes_replacement_character() {
    assert_eq!(decode_one(&[0xc3, 0x41]), KeyPress::char(char::REPLACEMENT_CHARACTER));
    assert_eq!(decode_one(&[0x80]), KeyPress::char(char::REPLACEMENT_CHARACTER));
    assert_eq!(decode_one(&[0xff, 0x80, 0x80, 0x80]), KeyPress::char(char::REPLACEMENT_CHARACTER));
}

#[test]
fn truncated_utf8_becomes_replacement_character() {
    let mut decoder = KeyDecoder::new(Script::new(&[0xe2, 0x82]).with_pause());
    assert_eq!(
        decoder.next_key().unwrap(),
        KeyPress::char(char::REPLACEMENT_CHARACTER)
    );
}

#[test]
fn nul_and_del_map_to_named_codes() {
    assert_eq!(decode_one(&[0x00]), KeyPress::code(KeyCode::Unknown));
    assert_eq!(decode_one(&[0x7f]), KeyPress::code(KeyCode::Backspace));
}

#[test]
fn control_bytes_pass_through_as_scalars() {
    assert_eq!(decode_one(&[0x17]), KeyPress::char(CTRL_W));
    assert_eq!(decode_one(b"\t"), KeyPress::char('\t'));
    assert_eq!(decode_one(b"\r"), KeyPress::char('\r'));
}

#[test]
fn lone_escape_times_out_to_escape() {
    let mut decoder = KeyDecoder::new(Script::new(b"\x1b").with_pause());
    assert_eq!(decoder.next_key().unwrap(), KeyPress::code(KeyCode::Escape));
}

#[test]
fn double_escape_is_one_escape() {
    assert_eq!(
        decode_all(b"\x1b\x1bx"),
        vec![KeyPress::code(KeyCode::Escape), KeyPress::char('x')]
    );
}

#[test]
fn alt_modified_character() {
    assert_eq!(
        decode_one(b"\x1bx"),
        KeyPress::char('x').with_modifiers(Modifiers::ALT)
    );
}

#[test]
fn csi_letters_and_backtab() {
    assert_eq!(
        decode_all(b"\x1b[B\x1b[C\x1b[D\x1b[H\x1b[F\x1b[Z"),
        vec![
            KeyPress::code(KeyCode::Down),
            KeyPress::code(KeyCode::Right),
            KeyPress::code(KeyCode::Left),
            KeyPress::code(KeyCode::Home),
            KeyPress::code(KeyCode::End),
            KeyPress::code(KeyCode::BackTab),
        ]
    );
}

#[test]
fn ss3_application_mode_keys() {
    assert_eq!(
        decode_all(b"\x1bOA\x1bOB\x1bOC\x1bOD\x1bOH\x1bOF"),
        vec![
            KeyPress::code(KeyCode::Up),
            KeyPress::code(KeyCode::Down),
            KeyPress::code(KeyCode::Right),
            KeyPress::code(KeyCode::Left),
            KeyPress::code(KeyCode::Home),
            KeyPress::code(KeyCode::End),
        ]
    );
}

#[test]
fn tilde_sequences_by_digit() {
    assert_eq!(
        decode_all(b"\x1b[1~\x1b[2~\x1b[3~\x1b[4~\x1b[5~\x1b[6~"),
        vec![
            KeyPress::code(KeyCode::Home),
            KeyPress::code(KeyCode::Insert),
            KeyPress::code(KeyCode::Delete),
            KeyPress::code(KeyCode::End),
            KeyPress::code(KeyCode::PageUp),
            KeyPress::code(KeyCode::PageDown),
        ]
    );
}

#[test]
fn unsupported_csi_is_consumed_as_unknown() {
    // F5 is ESC [ 1 5 ~; the trailing 'q' must decode on its own.
    assert_eq!(
        decode_all(b"\x1b[15~q\x1b[7~\x1b[2x"),
        vec![
            KeyPress::code(KeyCode::Unknown),
            KeyPress::char('q'),
            KeyPress::code(KeyCode::Unknown),
            KeyPress::code(KeyCode::Unknown),
        ]
    );
}

#[test]
fn overlong_csi_is_drained_up_to_its_final_byte() {
    assert_eq!(
        decode_all(b"\x1b[1;2;3;4;5;6;7;8;9~a"),
        vec![KeyPress::code(KeyCode::Unknown), KeyPress::char('a')]
    );
    // Intermediate bytes (0x20..=0x2f) belong to the sequence too.
    assert_eq!(
        decode_all(b"\x1b[2 qb"),
        vec![KeyPress::code(KeyCode::Unknown), KeyPress::char('b')]
    );
}

#[test]
fn ss3_with_unexpected_letter_is_unknown() {
    assert_eq!(decode_one(b"\x1bOP"), KeyPress::code(KeyCode::Unknown));
}

#[test]
fn modified_arrow_and_tilde_keys() {
    assert_eq!(
        decode_one(b"\x1b[1;5A"),
        KeyPress::code(KeyCode::Up).with_modifiers(Modifiers::CTRL)
    );
    assert_eq!(
        decode_one(b"\x1b[3;2~"),
        KeyPress::code(KeyCode::Delete).with_modifiers(Modifiers::SHIFT)
    );
}

#[test]
fn named_codes_survive_reencoding() {
    for code in KeyCode::ALL {
        let key = KeyPress::code(code);
        let mut decoder = KeyDecoder::new(Script::new(&key.to_ansi_bytes()).with_pause());
        assert_eq!(decoder.next_key().unwrap(), key, "{code:?}");
    }
}

#[test]
fn modified_named_codes_survive_reencoding() {
    let modifiers = [Modifiers::SHIFT, Modifiers::CTRL, Modifiers::ALT | Modifiers::CTRL];
    let codes = [
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Home,
        KeyCode::End,
        KeyCode::Insert,
        KeyCode::Delete,
        KeyCode::PageUp,
        KeyCode::PageDown,
    ];
    for code in codes {
        for modifier in modifiers {
            let key = KeyPress::code(code).with_modifiers(modifier);
            assert_eq!(decode_one(&key.to_ansi_bytes()), key, "{key}");
        }
    }
}

#[test]
fn key_display_is_readable() {
    assert_eq!(KeyPress::code(KeyCode::Up).to_string(), "Up");
    assert_eq!(KeyPress::char('\t').to_string(), "'\\t'");
    assert_eq!(
        KeyPress::code(KeyCode::Up)
            .with_modifiers(Modifiers::CTRL)
            .to_string(),
        "Up mod=4"
    );
    assert_eq!(hex_bytes(&[0x1b, 0x5b, 0x41]), "1b 5b 41");
}

/// Records how many reads have started so a test can compare against acks.
struct CountingKeys {
    reads: Arc<AtomicUsize>,
    remaining: usize,
}

impl KeySource for CountingKeys {
    fn next_key(&mut self) -> io::Result<KeyPress> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "done"));
        }
        self.remaining -= 1;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(KeyPress::char('k'))
    }
}

#[test]
fn pump_never_reads_ahead_of_acks() {
    const KEYS: usize = 25;
    let reads = Arc::new(AtomicUsize::new(0));
    let keys: EventChannel<KeyEvent> = EventChannel::new();
    let notes: EventChannel<Notification> = EventChannel::new();
    let source = CountingKeys {
        reads: Arc::clone(&reads),
        remaining: KEYS,
    };
    let handle = spawn_keyboard_thread(source, keys.sender(), notes.sender()).unwrap();

    for acked in 0..KEYS {
        let event = keys.wait_handle().recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.key, KeyPress::char('k'));
        thread::sleep(Duration::from_millis(2));
        assert_eq!(reads.load(Ordering::SeqCst), acked + 1);
        assert!(keys.is_empty());
        event.ack.signal();
    }

    handle.join().unwrap();
    match notes.try_recv() {
        Ok(Notification::FatalError { message }) => assert!(message.contains("keyboard")),
        other => panic!("expected fatal error, got {other:?}"),
    }
}

#[test]
fn pump_stops_when_ack_is_dropped() {
    let keys: EventChannel<KeyEvent> = EventChannel::new();
    let notes: EventChannel<Notification> = EventChannel::new();
    let reads = Arc::new(AtomicUsize::new(0));
    let source = CountingKeys {
        reads: Arc::clone(&reads),
        remaining: 10,
    };
    let key_tx = keys.sender();
    let note_tx = notes.sender();
    let worker = thread::spawn(move || run_pump(source, &key_tx, &note_tx));

    let event = keys.wait_handle().recv_timeout(Duration::from_secs(2)).unwrap();
    drop(event);
    worker.join().unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert!(notes.is_empty());
}
