//! Raw terminal bytes to [`KeyPress`] values.

use super::key::{hex_bytes, KeyCode, KeyPress, Modifiers, DEL, ESC};
use crate::{debug_enabled, log_debug};
use std::io;

/// Longest CSI parameter run we are willing to buffer.
const MAX_CSI_PARAMS: usize = 16;

/// Byte supply for [`KeyDecoder`].
pub trait ByteSource {
    /// Block until a byte is available.
    fn next_byte(&mut self) -> io::Result<u8>;

    /// Return the next byte if one arrives within the escape timeout.
    fn try_next_byte(&mut self) -> io::Result<Option<u8>>;
}

enum State {
    Normal,
    EscapeSeen,
    Csi(Vec<u8>),
    /// Over-long or intermediate-bearing CSI: drain it up to the final byte.
    CsiDiscard,
    Ss3,
}

/// Decodes exactly one keypress per call, consuming as many bytes as needed.
pub struct KeyDecoder<S> {
    source: S,
    trace: Vec<u8>,
}

impl<S: ByteSource> KeyDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            trace: Vec::with_capacity(8),
        }
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    pub fn next_key(&mut self) -> io::Result<KeyPress> {
        self.trace.clear();
        let key = self.decode()?;
        if debug_enabled() {
            log_debug(&format!("key {key} from [{}]", hex_bytes(&self.trace)));
        }
        Ok(key)
    }

    fn decode(&mut self) -> io::Result<KeyPress> {
        let mut state = State::Normal;
        loop {
            state = match state {
                State::Normal => {
                    let byte = self.blocking()?;
                    match byte {
                        0x00 => return Ok(unknown()),
                        ESC => State::EscapeSeen,
                        DEL => return Ok(KeyPress::code(KeyCode::Backspace)),
                        0x80..=0xff => return self.decode_utf8(byte),
                        _ => return Ok(KeyPress::char(char::from(byte))),
                    }
                }
                State::EscapeSeen => match self.timed()? {
                    None | Some(ESC) => return Ok(KeyPress::code(KeyCode::Escape)),
                    Some(b'[') => State::Csi(Vec::new()),
                    Some(b'O') => State::Ss3,
                    Some(DEL) => {
                        return Ok(KeyPress::code(KeyCode::Backspace).with_modifiers(Modifiers::ALT))
                    }
                    Some(byte @ 0x20..=0x7e) => {
                        return Ok(KeyPress::char(char::from(byte)).with_modifiers(Modifiers::ALT))
                    }
                    Some(_) => return Ok(unknown()),
                },
                State::Csi(mut params) => match self.timed()? {
                    Some(byte) if is_csi_param(byte) && params.len() < MAX_CSI_PARAMS => {
                        params.push(byte);
                        State::Csi(params)
                    }
                    Some(byte) if is_csi_param(byte) || is_csi_intermediate(byte) => State::CsiDiscard,
                    Some(byte) if is_csi_final(byte) => return Ok(finish_csi(&params, byte)),
                    _ => return Ok(unknown()),
                },
                State::CsiDiscard => match self.timed()? {
                    Some(byte) if is_csi_param(byte) || is_csi_intermediate(byte) => State::CsiDiscard,
                    _ => return Ok(unknown()),
                },
                State::Ss3 => {
                    let key = match self.timed()? {
                        Some(byte) => letter_code(byte).map(KeyPress::code),
                        None => None,
                    };
                    return Ok(key.unwrap_or_else(unknown));
                }
            };
        }
    }

    fn decode_utf8(&mut self, lead: u8) -> io::Result<KeyPress> {
        let len = match lead.leading_ones() {
            2 => 2,
            3 => 3,
            n if n >= 4 => 4,
            _ => 1,
        };
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(len).skip(1) {
            match self.timed()? {
                Some(byte) => *slot = byte,
                None => return Ok(KeyPress::char(char::REPLACEMENT_CHARACTER)),
            }
        }
        let ch = std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|text| text.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Ok(KeyPress::char(ch))
    }

    fn blocking(&mut self) -> io::Result<u8> {
        let byte = self.source.next_byte()?;
        self.trace.push(byte);
        Ok(byte)
    }

    fn timed(&mut self) -> io::Result<Option<u8>> {
        let byte = self.source.try_next_byte()?;
        if let Some(byte) = byte {
            self.trace.push(byte);
        }
        Ok(byte)
    }
}

fn unknown() -> KeyPress {
    KeyPress::code(KeyCode::Unknown)
}

#[inline]
fn is_csi_param(byte: u8) -> bool {
    (0x30..=0x3f).contains(&byte)
}

#[inline]
fn is_csi_intermediate(byte: u8) -> bool {
    (0x20..=0x2f).contains(&byte)
}

#[inline]
fn is_csi_final(byte: u8) -> bool {
    (0x40..=0x7e).contains(&byte)
}

fn letter_code(byte: u8) -> Option<KeyCode> {
    match byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

fn tilde_code(number: u16) -> Option<KeyCode> {
    match number {
        1 => Some(KeyCode::Home),
        2 => Some(KeyCode::Insert),
        3 => Some(KeyCode::Delete),
        4 => Some(KeyCode::End),
        5 => Some(KeyCode::PageUp),
        6 => Some(KeyCode::PageDown),
        _ => None,
    }
}

/// Numeric `;`-separated parameters; `None` for private or malformed runs.
fn parse_params(raw: &[u8]) -> Option<Vec<u16>> {
    if raw.is_empty() {
        return Some(Vec::new());
    }
    raw.split(|byte| *byte == b';')
        .map(|piece| {
            if piece.is_empty() || !piece.iter().all(u8::is_ascii_digit) {
                return None;
            }
            std::str::from_utf8(piece).ok()?.parse().ok()
        })
        .collect()
}

fn finish_csi(raw: &[u8], final_byte: u8) -> KeyPress {
    let Some(params) = parse_params(raw) else {
        return unknown();
    };
    if let Some(code) = letter_code(final_byte) {
        return match params.as_slice() {
            [] | [1] => KeyPress::code(code),
            [1, modifier] => KeyPress::code(code).with_modifiers(Modifiers::from_xterm_param(*modifier)),
            _ => unknown(),
        };
    }
    match (final_byte, params.as_slice()) {
        (b'Z', []) => KeyPress::code(KeyCode::BackTab),
        (b'~', [number]) => tilde_code(*number).map_or_else(unknown, KeyPress::code),
        (b'~', [number, modifier]) => tilde_code(*number).map_or_else(unknown, |code| {
            KeyPress::code(code).with_modifiers(Modifiers::from_xterm_param(*modifier))
        }),
        _ => unknown(),
    }
}
