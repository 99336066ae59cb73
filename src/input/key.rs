use std::fmt;

pub const ESC: u8 = 0x1b;
pub const DEL: u8 = 0x7f;

/// Ctrl-W, delete previous word.
pub const CTRL_W: char = '\u{17}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    BackTab,
    Backspace,
    Escape,
    Unknown,
}

impl KeyCode {
    pub const ALL: [KeyCode; 14] = [
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Home,
        KeyCode::End,
        KeyCode::PageUp,
        KeyCode::PageDown,
        KeyCode::Insert,
        KeyCode::Delete,
        KeyCode::BackTab,
        KeyCode::Backspace,
        KeyCode::Escape,
        KeyCode::Unknown,
    ];
}

/// Modifier bitset, using the xterm parameter encoding minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(2);
    pub const CTRL: Modifiers = Modifiers(4);
    pub const META: Modifiers = Modifiers(8);

    /// `param` is the second CSI parameter, e.g. the `5` in `ESC [ 1 ; 5 A`.
    pub fn from_xterm_param(param: u16) -> Self {
        let bits = param.saturating_sub(1).min(0x0f) as u8;
        Modifiers(bits)
    }

    pub fn xterm_param(self) -> u16 {
        u16::from(self.0) + 1
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Code(KeyCode),
    Char(char),
}

/// One decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub const fn code(code: KeyCode) -> Self {
        Self {
            key: Key::Code(code),
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn char(ch: char) -> Self {
        Self {
            key: Key::Char(ch),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Canonical terminal encoding, the inverse of the decoder.
    pub fn to_ansi_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let modifiers = self.modifiers;
        match self.key {
            Key::Char(ch) => {
                if modifiers.contains(Modifiers::ALT) {
                    out.push(ESC);
                }
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Key::Code(code) => match code {
                KeyCode::Up => csi_letter(&mut out, b'A', modifiers),
                KeyCode::Down => csi_letter(&mut out, b'B', modifiers),
                KeyCode::Right => csi_letter(&mut out, b'C', modifiers),
                KeyCode::Left => csi_letter(&mut out, b'D', modifiers),
                KeyCode::Home => csi_letter(&mut out, b'H', modifiers),
                KeyCode::End => csi_letter(&mut out, b'F', modifiers),
                KeyCode::Insert => csi_tilde(&mut out, 2, modifiers),
                KeyCode::Delete => csi_tilde(&mut out, 3, modifiers),
                KeyCode::PageUp => csi_tilde(&mut out, 5, modifiers),
                KeyCode::PageDown => csi_tilde(&mut out, 6, modifiers),
                KeyCode::BackTab => out.extend_from_slice(b"\x1b[Z"),
                KeyCode::Backspace => out.push(DEL),
                KeyCode::Escape => out.push(ESC),
                KeyCode::Unknown => out.push(0),
            },
        }
        out
    }
}

fn csi_letter(out: &mut Vec<u8>, letter: u8, modifiers: Modifiers) {
    out.extend_from_slice(b"\x1b[");
    if !modifiers.is_empty() {
        out.extend_from_slice(format!("1;{}", modifiers.xterm_param()).as_bytes());
    }
    out.push(letter);
}

fn csi_tilde(out: &mut Vec<u8>, number: u8, modifiers: Modifiers) {
    out.extend_from_slice(b"\x1b[");
    out.push(b'0' + number);
    if !modifiers.is_empty() {
        out.extend_from_slice(format!(";{}", modifiers.xterm_param()).as_bytes());
    }
    out.push(b'~');
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Key::Code(code) => write!(f, "{code:?}")?,
            Key::Char(ch) => write!(f, "'{}'", ch.escape_debug())?,
        }
        if !self.modifiers.is_empty() {
            write!(f, " mod={}", self.modifiers.bits())?;
        }
        Ok(())
    }
}

/// Render raw bytes for the debug log, e.g. `1b 5b 41`.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
