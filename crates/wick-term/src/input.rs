// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and paste events. The terminal is put
// in plain raw mode with bracketed paste, so the protocols to decode are
// the legacy ones:
//
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows, Home/End, and the tilde-terminated editing
//   keys, with the xterm `;modifier` parameter
// - SS3 arrows (application cursor mode)
// - Alt+key as ESC followed by a printable byte
// - Bracketed paste (`CSI 200~ ... CSI 201~`)
// - UTF-8 multi-byte characters
//
// Sequences can be split across reads, so unconsumed bytes stay buffered
// until the next `advance`. A lone ESC is ambiguous until the event loop
// times out and calls `flush`, which turns it into an Escape keypress.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Bracketed paste content, delivered as one unit.
    Paste(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key.
    pub code: KeyCode,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys, using the xterm parameter bit layout (`param - 1`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental input parser.
///
/// ```
/// use wick_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"a\x1b[D");
/// assert_eq!(events, vec![
///     Event::Key(KeyEvent::plain(KeyCode::Char('a'))),
///     Event::Key(KeyEvent::plain(KeyCode::Left)),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

/// Outcome of parsing at one position.
enum Step {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

impl Parser {
    /// An empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
        }
    }

    /// Feed bytes and return every complete event.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find(rest, PASTE_END) else { break };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            if rest.len() < PASTE_START.len() && rest.len() > 2 && PASTE_START.starts_with(rest) {
                break;
            }

            match parse_one(rest) {
                Step::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Step::Incomplete => break,
                Step::Skip(n) => pos += n.max(1),
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() && !self.in_paste
    }

    /// Resolve pending bytes as literal keys after an input timeout.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            return Vec::new();
        }
        let events = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(b as char))),
                _ => None,
            })
            .map(Event::Key)
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless parsing ──────────────────────────────────────────────────────

fn parse_one(buf: &[u8]) -> Step {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => key(KeyCode::Backspace, 1),
        0x09 => key(KeyCode::Tab, 1),
        0x0A | 0x0D => key(KeyCode::Enter, 1),
        b @ 0x01..=0x1A => Step::Event(
            Event::Key(KeyEvent {
                code: KeyCode::Char((b + b'a' - 1) as char),
                modifiers: Modifiers::CTRL,
            }),
            1,
        ),
        b @ 0x20..=0x7E => key(KeyCode::Char(b as char), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Step::Skip(1),
    }
}

fn key(code: KeyCode, used: usize) -> Step {
    Step::Event(Event::Key(KeyEvent::plain(code)), used)
}

fn key_with(code: KeyCode, modifiers: Modifiers, used: usize) -> Step {
    Step::Event(Event::Key(KeyEvent { code, modifiers }), used)
}

fn parse_escape(buf: &[u8]) -> Step {
    if buf.len() < 2 {
        return Step::Incomplete;
    }
    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => key_with(KeyCode::Char(b as char), Modifiers::ALT, 2),
        _ => key(KeyCode::Escape, 1),
    }
}

fn parse_csi(buf: &[u8]) -> Step {
    let Some(offset) = buf[2..].iter().position(|b| (0x40..=0x7E).contains(b)) else {
        return if buf[2..].iter().all(|b| (0x20..=0x3F).contains(b)) {
            Step::Incomplete
        } else {
            Step::Skip(buf.len())
        };
    };
    let end = 2 + offset;
    let params: Vec<u16> = buf[2..end]
        .split(|&b| b == b';')
        .map(|p| {
            p.iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect();
    let used = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&m| decode_modifiers(m));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => KeyCode::BackTab,
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Step::Skip(used),
        },
        _ => return Step::Skip(used),
    };
    key_with(code, modifiers, used)
}

fn parse_ss3(buf: &[u8]) -> Step {
    if buf.len() < 3 {
        return Step::Incomplete;
    }
    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Step::Skip(3),
    };
    key(code, 3)
}

fn parse_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Step::Skip(1),
    };
    if buf.len() < len {
        return Step::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => key(KeyCode::Char(ch), len),
        None => Step::Skip(1),
    }
}

/// xterm modifier parameter: `1 + bitmask`.
fn decode_modifiers(param: u16) -> Modifiers {
    let bits = u8::try_from(param.saturating_sub(1)).unwrap_or(0);
    Modifiers::from_bits_truncate(bits)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(events: &[Event]) -> Vec<KeyCode> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Key(k) => Some(k.code),
                Event::Paste(_) => None,
            })
            .collect()
    }

    #[test]
    fn printable_ascii() {
        let mut p = Parser::new();
        assert_eq!(
            keys(&p.advance(b"hi")),
            vec![KeyCode::Char('h'), KeyCode::Char('i')]
        );
    }

    #[test]
    fn control_bytes() {
        let mut p = Parser::new();
        assert_eq!(
            keys(&p.advance(b"\r\n\t\x7f")),
            vec![KeyCode::Enter, KeyCode::Enter, KeyCode::Tab, KeyCode::Backspace]
        );
    }

    #[test]
    fn ctrl_letter() {
        let mut p = Parser::new();
        let events = p.advance(b"\x03");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: Modifiers::CTRL,
            })]
        );
    }

    #[test]
    fn arrows_csi_and_ss3() {
        let mut p = Parser::new();
        assert_eq!(
            keys(&p.advance(b"\x1b[A\x1b[B\x1bOC\x1bOD")),
            vec![KeyCode::Up, KeyCode::Down, KeyCode::Right, KeyCode::Left]
        );
    }

    #[test]
    fn tilde_keys() {
        let mut p = Parser::new();
        assert_eq!(
            keys(&p.advance(b"\x1b[3~\x1b[5~\x1b[6~\x1b[1~\x1b[4~")),
            vec![
                KeyCode::Delete,
                KeyCode::PageUp,
                KeyCode::PageDown,
                KeyCode::Home,
                KeyCode::End
            ]
        );
    }

    #[test]
    fn modified_arrow() {
        let mut p = Parser::new();
        let events = p.advance(b"\x1b[1;5C");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent {
                code: KeyCode::Right,
                modifiers: Modifiers::CTRL,
            })]
        );
    }

    #[test]
    fn split_sequence_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert!(p.has_pending());
        assert_eq!(keys(&p.advance(b"D")), vec![KeyCode::Left]);
        assert!(!p.has_pending());
    }

    #[test]
    fn lone_escape_resolved_by_flush() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(keys(&p.flush()), vec![KeyCode::Escape]);
        assert!(!p.has_pending());
    }

    #[test]
    fn alt_letter() {
        let mut p = Parser::new();
        let events = p.advance(b"\x1bx");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent {
                code: KeyCode::Char('x'),
                modifiers: Modifiers::ALT,
            })]
        );
    }

    #[test]
    fn utf8_characters() {
        let mut p = Parser::new();
        assert_eq!(
            keys(&p.advance("φ中".as_bytes())),
            vec![KeyCode::Char('φ'), KeyCode::Char('中')]
        );
    }

    #[test]
    fn utf8_split_across_reads() {
        let mut p = Parser::new();
        let bytes = "φ".as_bytes();
        assert!(p.advance(&bytes[..1]).is_empty());
        assert_eq!(keys(&p.advance(&bytes[1..])), vec![KeyCode::Char('φ')]);
    }

    #[test]
    fn bracketed_paste() {
        let mut p = Parser::new();
        let events = p.advance(b"\x1b[200~\\phi_{1}\x1b[201~x");
        assert_eq!(
            events,
            vec![
                Event::Paste("\\phi_{1}".into()),
                Event::Key(KeyEvent::plain(KeyCode::Char('x'))),
            ]
        );
    }

    #[test]
    fn bracketed_paste_split() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[200~ab").is_empty());
        assert!(p.flush().is_empty());
        assert_eq!(p.advance(b"c\x1b[201~"), vec![Event::Paste("abc".into())]);
    }

    #[test]
    fn unknown_csi_skipped() {
        let mut p = Parser::new();
        assert_eq!(keys(&p.advance(b"\x1b[99zq")), vec![KeyCode::Char('q')]);
    }
}
