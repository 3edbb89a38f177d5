// SPDX-License-Identifier: MIT
//
// One-line text input for the bottom prompt row.
//
// Used for slot editing (`i`) and for the three count questions of the
// resize command (`r`). The cursor is a byte offset that always sits on a
// grapheme boundary, so Backspace removes a whole user-perceived character
// (`é` typed as e + combining accent, a flag emoji) in one press.

use unicode_segmentation::UnicodeSegmentation;
use wick_term::buffer::string_width;

/// Which characters the input accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Anything printable.
    Text,
    /// ASCII digits only.
    Digits,
}

/// Editable single line with a cursor.
#[derive(Debug, Clone)]
pub struct LineInput {
    label: String,
    input: String,
    /// Byte offset into `input`, on a grapheme boundary.
    cursor: usize,
    accept: Accept,
    /// Maximum number of graphemes.
    max_len: usize,
}

impl LineInput {
    pub fn new(label: impl Into<String>, accept: Accept, max_len: usize) -> Self {
        Self {
            label: label.into(),
            input: String::new(),
            cursor: 0,
            accept,
            max_len,
        }
    }

    /// Prompt text shown before the input.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Screen column of the cursor relative to the start of the input.
    pub fn cursor_column(&self) -> usize {
        string_width(&self.input[..self.cursor])
    }

    fn len(&self) -> usize {
        self.input.graphemes(true).count()
    }

    /// Insert one character at the cursor. Returns `false` when rejected.
    pub fn insert_char(&mut self, ch: char) -> bool {
        let allowed = match self.accept {
            Accept::Text => !ch.is_control(),
            Accept::Digits => ch.is_ascii_digit(),
        };
        if !allowed || self.len() >= self.max_len {
            return false;
        }
        self.input.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        // A combining mark merges with the grapheme before it; keep the
        // cursor after the merged cluster.
        self.cursor = self.snap_forward(self.cursor);
        true
    }

    /// Insert pasted text, stopping at the first rejected character.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            if !self.insert_char(ch) {
                break;
            }
        }
    }

    /// Delete the grapheme before the cursor.
    pub fn backspace(&mut self) -> bool {
        let Some((start, _)) = self.input[..self.cursor].grapheme_indices(true).next_back() else {
            return false;
        };
        self.input.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Delete the grapheme under the cursor.
    pub fn delete(&mut self) -> bool {
        let Some(g) = self.input[self.cursor..].graphemes(true).next() else {
            return false;
        };
        let end = self.cursor + g.len();
        self.input.replace_range(self.cursor..end, "");
        true
    }

    pub fn move_left(&mut self) {
        if let Some((start, _)) = self.input[..self.cursor].grapheme_indices(true).next_back() {
            self.cursor = start;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(g) = self.input[self.cursor..].graphemes(true).next() {
            self.cursor += g.len();
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// The trimmed input, or `None` when blank.
    pub fn value(&self) -> Option<&str> {
        let trimmed = self.input.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    fn snap_forward(&self, pos: usize) -> usize {
        self.input
            .grapheme_indices(true)
            .map(|(i, g)| i + g.len())
            .find(|&end| end >= pos)
            .unwrap_or(self.input.len())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
