// SPDX-License-Identifier: MIT
//
// Key-to-command translation for normal mode.
//
// | Key                         | Command        |
// |-----------------------------|----------------|
// | Left / Up / h / k           | previous slot  |
// | Right / Down / l / j        | next slot      |
// | Enter / Space               | select         |
// | Backspace / Delete          | remove         |
// | d                           | clear all      |
// | i                           | edit slot      |
// | y / p                       | yank / paste   |
// | v                           | preview        |
// | Esc                         | hide preview   |
// | c                           | copy snippet   |
// | r                           | resize counts  |
// | q / Ctrl+C                  | quit           |
//
// Letters match in either case.

use wick_term::input::{KeyCode, KeyEvent, Modifiers};

/// Everything the user can ask for outside a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MovePrev,
    MoveNext,
    Select,
    Remove,
    Clear,
    Edit,
    Yank,
    Paste,
    Preview,
    HidePreview,
    Copy,
    Resize,
    Quit,
}

/// Map a key press to a command. Unbound keys give `None`.
pub fn translate(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(Modifiers::CTRL) {
        return matches!(key.code, KeyCode::Char('c' | 'C')).then_some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Left | KeyCode::Up => Command::MovePrev,
        KeyCode::Right | KeyCode::Down => Command::MoveNext,
        KeyCode::Enter => Command::Select,
        KeyCode::Backspace | KeyCode::Delete => Command::Remove,
        KeyCode::Escape => Command::HidePreview,
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'h' | 'k' => Command::MovePrev,
            'l' | 'j' => Command::MoveNext,
            ' ' => Command::Select,
            'd' => Command::Clear,
            'i' => Command::Edit,
            'y' => Command::Yank,
            'p' => Command::Paste,
            'v' => Command::Preview,
            'c' => Command::Copy,
            'r' => Command::Resize,
            'q' => Command::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
