//! Terminal byte-stream decoder.
//!
//! Turns raw bytes into keyboard and mouse events. Supports SGR (1006)
//! mouse encoding, CSI cursor/function keys with modifiers, SS3
//! sequences, Alt+key, control characters, and UTF-8 text. Sequences
//! split across reads are buffered until complete; malformed sequences
//! are consumed silently and yield no event.

use crate::input::keyboard::{KeyCode, KeyEvent, KeyModifiers};
use crate::input::mouse::{MouseButton, MouseInput, MouseInputKind};

/// A decoded input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseInput),
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<MouseInput> for InputEvent {
    fn from(event: MouseInput) -> Self {
        Self::Mouse(event)
    }
}

/// A CSI sequence longer than this without a final byte is garbage and
/// gets dropped wholesale.
const MAX_CSI_LEN: usize = 64;

enum Outcome {
    /// Decoded an event and the byte count it consumed.
    Event(InputEvent, usize),
    /// Need more bytes to decide.
    Incomplete,
    /// Consume bytes silently (malformed or unsupported).
    Skip(usize),
}

/// Stateful decoder; holds bytes of an incomplete trailing sequence
/// between feeds.
#[derive(Clone, Debug, Default)]
pub struct InputParser {
    pending: Vec<u8>,
}

impl InputParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event decodable so far. Trailing
    /// incomplete sequences are kept for the next feed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut offset = 0;
        while offset < self.pending.len() {
            match parse_one(&self.pending[offset..]) {
                Outcome::Event(event, consumed) => {
                    events.push(event);
                    offset += consumed;
                }
                Outcome::Skip(consumed) => {
                    offset += consumed;
                }
                Outcome::Incomplete => break,
            }
        }
        self.pending.drain(..offset);
        events
    }

    /// Resolve a buffered lone ESC as the Escape key.
    ///
    /// A bare ESC byte is indistinguishable from the start of a
    /// sequence; hosts call this after a short read timeout.
    pub fn flush(&mut self) -> Option<InputEvent> {
        if self.pending == [0x1b] {
            self.pending.clear();
            return Some(KeyEvent::key(KeyCode::Esc).into());
        }
        None
    }

    /// Number of buffered, not-yet-decodable bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any buffered partial sequence.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

fn parse_one(input: &[u8]) -> Outcome {
    let Some(&first) = input.first() else {
        return Outcome::Incomplete;
    };
    match first {
        0x1b => parse_escape(input),
        0x00 => key(KeyCode::Null, 1),
        0x09 => key(KeyCode::Tab, 1),
        0x0a | 0x0d => key(KeyCode::Enter, 1),
        0x01..=0x1a => {
            let c = (first - 1 + b'a') as char;
            Outcome::Event(
                KeyEvent::new(KeyCode::Char(c), KeyModifiers::CTRL).into(),
                1,
            )
        }
        0x7f => key(KeyCode::Backspace, 1),
        0x20..=0x7e => Outcome::Event(KeyEvent::char(first as char).into(), 1),
        0x80..=0xff => parse_utf8(input),
        _ => Outcome::Skip(1),
    }
}

fn key(code: KeyCode, consumed: usize) -> Outcome {
    Outcome::Event(KeyEvent::key(code).into(), consumed)
}

fn parse_escape(input: &[u8]) -> Outcome {
    if input.len() == 1 {
        // Bare ESC or start of a sequence; wait for more bytes.
        return Outcome::Incomplete;
    }
    match input[1] {
        b'[' => parse_csi(input),
        b'O' => parse_ss3(input),
        0x1b => key(KeyCode::Esc, 1),
        0x20..=0x7e => {
            let c = input[1] as char;
            Outcome::Event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT).into(), 2)
        }
        _ => key(KeyCode::Esc, 1),
    }
}

fn parse_ss3(input: &[u8]) -> Outcome {
    if input.len() < 3 {
        return Outcome::Incomplete;
    }
    let code = match input[2] {
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Outcome::Skip(3),
    };
    key(code, 3)
}

fn parse_csi(input: &[u8]) -> Outcome {
    // Find the final byte (0x40-0x7e)
    let mut end = 2;
    while end < input.len() {
        if (0x40..=0x7e).contains(&input[end]) {
            break;
        }
        end += 1;
    }
    if end >= input.len() {
        if input.len() > MAX_CSI_LEN {
            return Outcome::Skip(input.len());
        }
        return Outcome::Incomplete;
    }

    let final_byte = input[end];
    let params = &input[2..end];
    let consumed = end + 1;

    match final_byte {
        b'A' => modified_key(params, KeyCode::Up, consumed),
        b'B' => modified_key(params, KeyCode::Down, consumed),
        b'C' => modified_key(params, KeyCode::Right, consumed),
        b'D' => modified_key(params, KeyCode::Left, consumed),
        b'H' => modified_key(params, KeyCode::Home, consumed),
        b'F' => modified_key(params, KeyCode::End, consumed),
        b'Z' => key(KeyCode::BackTab, consumed),
        b'~' => parse_tilde_key(params, consumed),
        b'M' | b'm' => {
            if params.first() == Some(&b'<') {
                parse_sgr_mouse(&params[1..], final_byte == b'm', consumed)
            } else if final_byte == b'M' {
                // Legacy X10 encoding: CSI M followed by three raw
                // bytes. Unsupported; drop the whole sequence so the
                // payload bytes do not decode as text.
                if input.len() < consumed + 3 {
                    Outcome::Incomplete
                } else {
                    Outcome::Skip(consumed + 3)
                }
            } else {
                Outcome::Skip(consumed)
            }
        }
        _ => Outcome::Skip(consumed),
    }
}

fn modified_key(params: &[u8], code: KeyCode, consumed: usize) -> Outcome {
    Outcome::Event(KeyEvent::new(code, parse_modifiers(params)).into(), consumed)
}

/// Decode the `1;N` CSI modifier parameter, where `N - 1` is a bitmask
/// of shift (1), alt (2), ctrl (4).
fn parse_modifiers(params: &[u8]) -> KeyModifiers {
    let Ok(s) = std::str::from_utf8(params) else {
        return KeyModifiers::empty();
    };
    let Some(n) = s.split(';').nth(1).and_then(|p| p.parse::<u8>().ok()) else {
        return KeyModifiers::empty();
    };
    let n = n.saturating_sub(1);
    let mut mods = KeyModifiers::empty();
    if n & 1 != 0 {
        mods |= KeyModifiers::SHIFT;
    }
    if n & 2 != 0 {
        mods |= KeyModifiers::ALT;
    }
    if n & 4 != 0 {
        mods |= KeyModifiers::CTRL;
    }
    mods
}

fn parse_tilde_key(params: &[u8], consumed: usize) -> Outcome {
    let Ok(s) = std::str::from_utf8(params) else {
        return Outcome::Skip(consumed);
    };
    let num: u8 = s
        .split(';')
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    let code = match num {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F(num - 10),
        17..=21 => KeyCode::F(num - 11),
        23 | 24 => KeyCode::F(num - 12),
        _ => return Outcome::Skip(consumed),
    };
    Outcome::Event(
        KeyEvent::new(code, parse_modifiers(params)).into(),
        consumed,
    )
}

/// Decode SGR mouse params `Pb ; Px ; Py` (already stripped of `<`).
fn parse_sgr_mouse(params: &[u8], is_release: bool, consumed: usize) -> Outcome {
    let Ok(s) = std::str::from_utf8(params) else {
        return Outcome::Skip(consumed);
    };
    let parts: Vec<&str> = s.split(';').collect();
    if parts.len() < 3 {
        return Outcome::Skip(consumed);
    }
    let cb: u8 = parts[0].parse().unwrap_or(0);
    let x = parts[1].parse::<i32>().unwrap_or(1) - 1;
    let y = parts[2].parse::<i32>().unwrap_or(1) - 1;

    let low = cb & 0b0000_0011;
    let motion = cb & 0b0010_0000 != 0;
    let scroll = cb & 0b0100_0000 != 0;

    let (button, kind) = if scroll {
        let kind = match low {
            0 => MouseInputKind::ScrollUp,
            1 => MouseInputKind::ScrollDown,
            // Horizontal scroll is not modeled
            _ => return Outcome::Skip(consumed),
        };
        (MouseButton::None, kind)
    } else {
        let button = match low {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        };
        let kind = if motion {
            MouseInputKind::Move
        } else if is_release {
            MouseInputKind::Release
        } else {
            MouseInputKind::Press
        };
        (button, kind)
    };

    let shift = cb & 0b0000_0100 != 0;
    let alt = cb & 0b0000_1000 != 0;
    let ctrl = cb & 0b0001_0000 != 0;
    Outcome::Event(
        MouseInput::new(x, y, button, kind)
            .with_modifiers(shift, ctrl, alt)
            .into(),
        consumed,
    )
}

fn parse_utf8(input: &[u8]) -> Outcome {
    let first = input[0];
    let expected_len = if first & 0b1110_0000 == 0b1100_0000 {
        2
    } else if first & 0b1111_0000 == 0b1110_0000 {
        3
    } else if first & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        return Outcome::Skip(1);
    };
    if input.len() < expected_len {
        return Outcome::Incomplete;
    }
    match std::str::from_utf8(&input[..expected_len]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Outcome::Event(KeyEvent::char(c).into(), expected_len),
            None => Outcome::Skip(expected_len),
        },
        Err(_) => Outcome::Skip(1),
    }
}
