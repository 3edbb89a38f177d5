// SPDX-License-Identifier: MIT
//
// The session controller.
//
// `WickApp` owns the diagram session and the preview pipeline and
// implements the event loop's `App` trait:
//
//   key → command::translate → dispatch → Session mutation → status line
//   tick → pipeline.poll → status line / preview placement
//   paint → view::paint → frame buffer
//   overlay → kitty image placement, after the cells are on screen
//
// Prompts (slot edit, resize counts) take over the keyboard until Enter or
// Esc. Rejected gestures never change the session; they only set the
// status message.

use std::path::PathBuf;

use tracing::{debug, info};
use wick_core::{Category, Error, OperatorCounts, Selection, Session};
use wick_host::{ClipboardError, JobId, JobStatus, PreviewPipeline};
use wick_term::ansi::CursorShape;
use wick_term::buffer::FrameBuffer;
use wick_term::event_loop::{Action, App};
use wick_term::graphics::{self, GraphicsSupport, Placement};
use wick_term::input::{Event, KeyCode, KeyEvent};
use wick_term::terminal::Size;

use crate::command::{self, Command};
use crate::prompt::{Accept, LineInput};
use crate::view::{self, View};

/// Longest slot content the edit prompt takes.
const CONTENT_MAX: usize = 256;
/// Digits accepted per count.
const COUNT_DIGITS: usize = 6;

const WELCOME: &str = "Use arrows to move, Enter to start a contraction.";

/// Copies text to the system clipboard; swapped out in tests.
pub type Copier = fn(&str) -> Result<&'static str, ClipboardError>;

// ─── Modes ──────────────────────────────────────────────────────────────────

enum Mode {
    Normal,
    /// Editing the content of one slot.
    Edit { index: usize, line: LineInput },
    /// Asking for the three counts, one category at a time.
    Resize {
        step: usize,
        counts: OperatorCounts,
        line: LineInput,
    },
}

fn count_prompt(category: Category, current: usize) -> LineInput {
    LineInput::new(
        format!("{} ({current}): ", category.display_name()),
        Accept::Digits,
        COUNT_DIGITS,
    )
}

// ─── Preview display ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PreviewView {
    image: Option<PathBuf>,
    /// Region computed by the last paint.
    region: Option<Placement>,
    /// Image must be (re)sent on the next overlay.
    dirty: bool,
    /// Earlier image must be removed on the next overlay.
    clear: bool,
}

impl PreviewView {
    fn show(&mut self, image: PathBuf) {
        self.image = Some(image);
        self.dirty = true;
    }

    fn hide(&mut self) {
        if self.image.take().is_some() {
            self.clear = true;
        }
        self.dirty = false;
    }
}

// ─── WickApp ────────────────────────────────────────────────────────────────

pub struct WickApp {
    session: Session,
    selected: usize,
    status: String,
    mode: Mode,
    pipeline: PreviewPipeline,
    /// Most recent preview request; older results are ignored.
    latest_job: Option<JobId>,
    graphics: GraphicsSupport,
    preview: PreviewView,
    copier: Copier,
    cursor_screen: Option<(u16, u16)>,
}

impl WickApp {
    pub fn new(session: Session, pipeline: PreviewPipeline, graphics: GraphicsSupport) -> Self {
        info!(counts = %session.registry().counts(), ?graphics, "session started");
        Self {
            session,
            selected: 0,
            status: WELCOME.to_owned(),
            mode: Mode::Normal,
            pipeline,
            latest_job: None,
            graphics,
            preview: PreviewView::default(),
            copier: wick_host::clipboard::copy,
            cursor_screen: None,
        }
    }

    #[cfg(test)]
    fn with_copier(mut self, copier: Copier) -> Self {
        self.copier = copier;
        self
    }

    pub const fn graphics(&self) -> GraphicsSupport {
        self.graphics
    }

    /// End the session. Dropping the pipeline removes the scratch directory
    /// without waiting for a running preview.
    pub fn into_session(self) -> Session {
        self.session
    }

    fn describe(&self, index: usize) -> String {
        self.session
            .slot(index)
            .map_or_else(|_| format!("slot {index}"), wick_core::Slot::describe)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    // ── Normal mode ──────────────────────────────────────────────────────

    fn handle_normal(&mut self, key: &KeyEvent) -> Action {
        let Some(cmd) = command::translate(key) else {
            return Action::Continue;
        };
        debug!(?cmd, selected = self.selected, "command");
        let idx = self.selected;
        match cmd {
            Command::Quit => return Action::Quit,
            Command::MovePrev => self.selected = idx.saturating_sub(1),
            Command::MoveNext => self.selected = (idx + 1).min(self.session.len().saturating_sub(1)),
            Command::Select => self.select(idx),
            Command::Remove => self.remove(idx),
            Command::Clear => {
                self.session.clear();
                info!("cleared all contractions");
                self.set_status("Cleared all contractions.");
            }
            Command::Edit => {
                let line = LineInput::new("New contents: ", Accept::Text, CONTENT_MAX);
                self.set_status(format!("{} value (blank keeps current):", self.describe(idx)));
                self.mode = Mode::Edit { index: idx, line };
            }
            Command::Yank => {
                let message = match self.session.yank(idx) {
                    Ok(()) => format!("Copied {}.", self.describe(idx)),
                    Err(e) => e.to_string(),
                };
                self.set_status(message);
            }
            Command::Paste => {
                let message = match self.session.paste(idx) {
                    Ok(()) => format!("Pasted into {}.", self.describe(idx)),
                    Err(Error::EmptyRegister) => "Clipboard is empty; copy a field first.".to_owned(),
                    Err(e) => e.to_string(),
                };
                self.set_status(message);
            }
            Command::Preview => {
                let busy = self.pipeline.is_busy();
                let id = self.pipeline.request(self.session.snippet());
                self.latest_job = Some(id);
                match self.pipeline.status(id) {
                    Some(JobStatus::Failed(msg)) => {
                        let msg = msg.clone();
                        self.set_status(msg);
                    }
                    _ if busy => self.set_status("Preview queued behind the one rendering now."),
                    _ => self.set_status("Rendering preview..."),
                }
            }
            Command::HidePreview => {
                if self.preview.image.is_some() {
                    self.preview.hide();
                    self.set_status("Preview hidden.");
                }
            }
            Command::Copy => {
                let message = match (self.copier)(&self.session.snippet()) {
                    Ok(program) => {
                        info!(program, "snippet copied");
                        "LaTeX snippet copied to clipboard.".to_owned()
                    }
                    Err(e) => e.to_string(),
                };
                self.set_status(message);
            }
            Command::Resize => {
                let current = self.session.registry().counts();
                self.mode = Mode::Resize {
                    step: 0,
                    counts: current,
                    line: count_prompt(Category::ALL[0], current.get(Category::ALL[0])),
                };
                self.set_status("Enter new counts (blank keeps current).");
            }
        }
        Action::Continue
    }

    fn select(&mut self, idx: usize) {
        let message = match self.session.select(idx) {
            Ok(Selection::Started(_)) => format!("Selected {}; pick a partner.", self.describe(idx)),
            Ok(Selection::Cancelled(_)) => "Canceled pending selection.".to_owned(),
            Ok(Selection::Completed(c)) => {
                info!(first = c.first, second = c.second, "contraction added");
                "Added contraction.".to_owned()
            }
            Err(Error::SlotAlreadyUsed(i)) => {
                format!("{} already participates in a contraction.", self.describe(i))
            }
            Err(e) => e.to_string(),
        };
        self.set_status(message);
    }

    fn remove(&mut self, idx: usize) {
        let message = match self.session.remove_involving(idx) {
            Ok(Some(c)) => {
                info!(first = c.first, second = c.second, "contraction removed");
                "Removed contraction.".to_owned()
            }
            Ok(None) => format!("No contraction to remove for {}.", self.describe(idx)),
            Err(e) => e.to_string(),
        };
        self.set_status(message);
    }

    // ── Prompts ──────────────────────────────────────────────────────────

    fn handle_prompt(&mut self, event: &Event) {
        let line = match &mut self.mode {
            Mode::Normal => return,
            Mode::Edit { line, .. } | Mode::Resize { line, .. } => line,
        };
        let key = match event {
            Event::Paste(text) => {
                line.insert_str(text);
                return;
            }
            Event::Key(key) => key,
        };
        match key.code {
            KeyCode::Char(ch) => {
                line.insert_char(ch);
            }
            KeyCode::Backspace => {
                line.backspace();
            }
            KeyCode::Delete => {
                line.delete();
            }
            KeyCode::Left => line.move_left(),
            KeyCode::Right => line.move_right(),
            KeyCode::Home => line.move_home(),
            KeyCode::End => line.move_end(),
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Escape => self.cancel_prompt(),
            _ => {}
        }
    }

    fn submit_prompt(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {}
            Mode::Edit { index, line } => {
                let desc = self.describe(index);
                let message = match line.value().map(|v| self.session.set_content(index, v)) {
                    Some(Ok(())) => format!("Updated {desc}."),
                    Some(Err(e)) => e.to_string(),
                    None => format!("Kept previous {}.", desc.to_lowercase()),
                };
                self.set_status(message);
            }
            Mode::Resize {
                step,
                mut counts,
                line,
            } => {
                let category = Category::ALL[step];
                if let Some(value) = line.value() {
                    counts.set(category, value.parse().unwrap_or(counts.get(category)));
                }
                if let Some(&next) = Category::ALL.get(step + 1) {
                    self.mode = Mode::Resize {
                        step: step + 1,
                        counts,
                        line: count_prompt(next, counts.get(next)),
                    };
                } else {
                    self.apply_counts(counts);
                }
            }
        }
    }

    fn apply_counts(&mut self, counts: OperatorCounts) {
        if counts.total() == 0 {
            self.set_status("Need at least one operator.");
            return;
        }
        match self.session.resize(counts) {
            Ok(()) => {
                info!(%counts, "rebuilt layout");
                self.selected = 0;
                self.set_status("Rebuilt layout with new counts.");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn cancel_prompt(&mut self) {
        let message = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Edit { index, .. } => format!("Kept previous {}.", self.describe(index).to_lowercase()),
            Mode::Resize { .. } => "Kept current counts.".to_owned(),
            Mode::Normal => return,
        };
        self.set_status(message);
    }

    // ── Preview polling ──────────────────────────────────────────────────

    /// Apply finished preview jobs. Returns whether anything changed.
    fn poll_preview(&mut self) -> bool {
        let mut changed = false;
        for (id, status) in self.pipeline.poll() {
            if Some(id) != self.latest_job {
                continue;
            }
            changed = true;
            match status {
                JobStatus::Done(image) if self.graphics.is_supported() => {
                    self.preview.show(image);
                    self.set_status("Preview updated.");
                }
                JobStatus::Done(image) => {
                    self.set_status(format!(
                        "Preview ready at {} (inline display needs the kitty graphics protocol).",
                        image.display()
                    ));
                }
                JobStatus::Failed(msg) => {
                    self.preview.hide();
                    self.set_status(msg);
                }
                JobStatus::Pending | JobStatus::Running => {}
            }
        }
        changed
    }
}

// ─── App implementation ─────────────────────────────────────────────────────

impl App for WickApp {
    fn on_event(&mut self, event: &Event) -> Action {
        if matches!(self.mode, Mode::Normal) {
            return match event {
                Event::Key(key) => self.handle_normal(key),
                Event::Paste(_) => Action::Continue,
            };
        }
        self.handle_prompt(event);
        Action::Continue
    }

    fn on_resize(&mut self, _size: Size) {
        if self.preview.image.is_some() {
            self.preview.dirty = true;
        }
    }

    fn on_tick(&mut self) -> bool {
        self.poll_preview()
    }

    fn paint(&mut self, buf: &mut FrameBuffer) {
        let prompt = match &self.mode {
            Mode::Normal => None,
            Mode::Edit { line, .. } | Mode::Resize { line, .. } => Some(line),
        };
        let painted = view::paint(
            buf,
            &View {
                session: &self.session,
                selected: self.selected,
                status: &self.status,
                prompt,
            },
        );
        self.cursor_screen = painted.cursor;

        if self.preview.region != Some(painted.preview) {
            self.preview.region = Some(painted.preview);
            self.preview.dirty |= self.preview.image.is_some();
        }
        if self.preview.image.is_some() && painted.preview.is_empty() {
            self.preview.hide();
            self.status = "Terminal too small to show the preview.".to_owned();
        }
    }

    fn overlay(&mut self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        if !self.graphics.is_supported() {
            return Ok(());
        }
        let mut out = out;
        if std::mem::take(&mut self.preview.clear) {
            graphics::delete_images(&mut out)?;
        }
        if std::mem::take(&mut self.preview.dirty) {
            if let (Some(image), Some(region)) = (&self.preview.image, self.preview.region) {
                graphics::place_png(&mut out, image, region)?;
            }
        }
        Ok(())
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        let (x, y) = self.cursor_screen?;
        Some((x, y, CursorShape::SteadyBar))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use wick_host::{Tool, ToolchainConfig};
    use wick_term::input::Modifiers;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn press(ch: char) -> Event {
        Event::Key(KeyEvent::plain(KeyCode::Char(ch)))
    }

    fn code(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn feed(app: &mut WickApp, events: &[Event]) {
        for event in events {
            app.on_event(event);
        }
    }

    fn type_text(app: &mut WickApp, text: &str) {
        for ch in text.chars() {
            app.on_event(&press(ch));
        }
    }

    fn copied(_: &str) -> Result<&'static str, ClipboardError> {
        Ok("fake")
    }

    fn no_clipboard(_: &str) -> Result<&'static str, ClipboardError> {
        Err(ClipboardError::NoTool)
    }

    fn missing_tools() -> PreviewPipeline {
        PreviewPipeline::with_toolchain(ToolchainConfig {
            compiler: Tool::new("wick-test-no-such-latexmk", &[]),
            rasterizer: Tool::new("wick-test-no-such-pdftoppm", &[]),
        })
        .unwrap()
    }

    fn app(i: usize, v: usize, e: usize) -> WickApp {
        let session = Session::new(OperatorCounts::new(i, v, e)).unwrap();
        WickApp::new(session, missing_tools(), GraphicsSupport::Unsupported).with_copier(copied)
    }

    /// 2/1/1 slots holding a, b, c, d.
    fn abcd() -> WickApp {
        let mut app = app(2, 1, 1);
        for (i, t) in ["a", "b", "c", "d"].into_iter().enumerate() {
            app.session.set_content(i, t).unwrap();
        }
        app
    }

    // ── Navigation and contractions ──────────────────────────────────────

    #[test]
    fn starts_with_welcome() {
        assert_eq!(abcd().status, WELCOME);
    }

    #[test]
    fn movement_is_clamped() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Left)]);
        assert_eq!(a.selected, 0);
        feed(&mut a, &[press('l'), press('l'), press('l'), press('l'), press('l')]);
        assert_eq!(a.selected, 3);
        feed(&mut a, &[press('k')]);
        assert_eq!(a.selected, 2);
    }

    #[test]
    fn pair_first_and_last() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Enter)]);
        assert_eq!(a.status, "Selected Input States #1; pick a partner.");
        feed(&mut a, &[press('l'), press('l'), press('l'), press(' ')]);
        assert_eq!(a.status, "Added contraction.");
        assert_eq!(a.session.snippet(), r"\braket{ \wick{ \c1{a}b|c|\c1{d} } }");
    }

    #[test]
    fn reselect_cancels_pending() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Enter), code(KeyCode::Enter)]);
        assert_eq!(a.status, "Canceled pending selection.");
        assert_eq!(a.session.pending(), None);
    }

    #[test]
    fn used_slot_is_rejected_without_change() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Enter), press('l'), code(KeyCode::Enter)]);
        let before = a.session.snippet();
        feed(&mut a, &[code(KeyCode::Enter)]);
        assert_eq!(a.status, "Input States #2 already participates in a contraction.");
        assert_eq!(a.session.snippet(), before);
    }

    #[test]
    fn remove_and_clear() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Backspace)]);
        assert_eq!(a.status, "No contraction to remove for Input States #1.");
        feed(&mut a, &[code(KeyCode::Enter), press('l'), code(KeyCode::Enter)]);
        feed(&mut a, &[code(KeyCode::Delete)]);
        assert_eq!(a.status, "Removed contraction.");
        assert!(a.session.contractions().is_empty());

        feed(&mut a, &[code(KeyCode::Enter), press('l'), code(KeyCode::Enter), press('d')]);
        assert_eq!(a.status, "Cleared all contractions.");
        assert!(a.session.contractions().is_empty());
    }

    #[test]
    fn quit_keys() {
        let mut a = abcd();
        assert_eq!(a.on_event(&press('q')), Action::Quit);
        let ctrl_c = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: Modifiers::CTRL,
        });
        assert_eq!(a.on_event(&ctrl_c), Action::Quit);
    }

    // ── Editing ──────────────────────────────────────────────────────────

    #[test]
    fn edit_replaces_trimmed_content() {
        let mut a = abcd();
        feed(&mut a, &[press('i')]);
        assert_eq!(a.status, "Input States #1 value (blank keeps current):");
        type_text(&mut a, r" \phi ");
        // Keys go to the prompt, not to commands.
        assert!(a.session.contractions().is_empty());
        feed(&mut a, &[code(KeyCode::Enter)]);
        assert_eq!(a.status, "Updated Input States #1.");
        assert_eq!(a.session.slot(0).unwrap().content, r"\phi");
    }

    #[test]
    fn blank_edit_keeps_content() {
        let mut a = abcd();
        feed(&mut a, &[press('i'), code(KeyCode::Enter)]);
        assert_eq!(a.status, "Kept previous input states #1.");
        assert_eq!(a.session.slot(0).unwrap().content, "a");

        feed(&mut a, &[press('i'), press('z'), code(KeyCode::Escape)]);
        assert_eq!(a.session.slot(0).unwrap().content, "a");
    }

    #[test]
    fn paste_event_goes_to_prompt() {
        let mut a = abcd();
        feed(&mut a, &[press('i'), Event::Paste("xyz".into()), code(KeyCode::Enter)]);
        assert_eq!(a.session.slot(0).unwrap().content, "xyz");
    }

    #[test]
    fn yank_and_paste() {
        let mut a = abcd();
        feed(&mut a, &[press('p')]);
        assert_eq!(a.status, "Clipboard is empty; copy a field first.");
        feed(&mut a, &[press('y')]);
        assert_eq!(a.status, "Copied Input States #1.");
        feed(&mut a, &[press('l'), press('l'), press('p')]);
        assert_eq!(a.status, "Pasted into Interaction Terms #1.");
        assert_eq!(a.session.slot(2).unwrap().content, "a");
    }

    // ── Resize ───────────────────────────────────────────────────────────

    #[test]
    fn resize_keeps_blank_answers_and_content() {
        let mut a = abcd();
        feed(&mut a, &[code(KeyCode::Enter), press('l'), code(KeyCode::Enter)]);
        feed(&mut a, &[press('r'), code(KeyCode::Enter)]);
        type_text(&mut a, "3");
        feed(&mut a, &[code(KeyCode::Enter), code(KeyCode::Enter)]);
        assert_eq!(a.status, "Rebuilt layout with new counts.");
        assert_eq!(a.session.registry().counts(), OperatorCounts::new(2, 3, 1));
        assert_eq!(a.session.slot(0).unwrap().content, "a");
        assert_eq!(a.session.slot(5).unwrap().content, "d");
        assert!(a.session.contractions().is_empty());
        assert_eq!(a.selected, 0);
    }

    #[test]
    fn resize_to_zero_is_rejected() {
        let mut a = abcd();
        feed(&mut a, &[press('r')]);
        for _ in 0..3 {
            type_text(&mut a, "0");
            feed(&mut a, &[code(KeyCode::Enter)]);
        }
        assert_eq!(a.status, "Need at least one operator.");
        assert_eq!(a.session.len(), 4);
    }

    #[test]
    fn resize_prompt_rejects_non_digits() {
        let mut a = abcd();
        feed(&mut a, &[press('r')]);
        type_text(&mut a, "-x");
        feed(&mut a, &[code(KeyCode::Escape)]);
        assert_eq!(a.status, "Kept current counts.");
        assert_eq!(a.session.registry().counts(), OperatorCounts::new(2, 1, 1));
    }

    // ── Clipboard and preview ────────────────────────────────────────────

    #[test]
    fn copy_reports_result() {
        let mut a = abcd();
        feed(&mut a, &[press('c')]);
        assert_eq!(a.status, "LaTeX snippet copied to clipboard.");

        let mut a = abcd().with_copier(no_clipboard);
        feed(&mut a, &[press('c')]);
        assert_eq!(
            a.status,
            "No clipboard tool found (tried pbcopy/xclip/xsel/clip.exe)."
        );
    }

    #[test]
    fn preview_without_tools_fails_and_keys_still_work() {
        let mut a = abcd();
        feed(&mut a, &[press('v')]);
        assert_eq!(a.status, "Rendering preview...");

        // Editing continues while the job runs.
        feed(&mut a, &[code(KeyCode::Enter)]);
        assert_eq!(a.session.pending(), Some(0));

        let mut ticks = 0;
        while !a.status.starts_with("Missing commands") {
            a.on_tick();
            ticks += 1;
            assert!(ticks < 500, "preview never failed: {}", a.status);
            thread::sleep(Duration::from_millis(10));
        }
        assert!(a.status.contains("wick-test-no-such-latexmk"));
    }

    #[test]
    fn second_preview_while_busy_is_queued() {
        let mut a = abcd();
        feed(&mut a, &[press('v'), press('v')]);
        assert_eq!(a.status, "Preview queued behind the one rendering now.");
    }

    #[test]
    fn overlay_is_silent_without_graphics() {
        let mut a = abcd();
        a.preview.show(PathBuf::from("/tmp/x.png"));
        let mut out = Vec::new();
        a.overlay(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn overlay_places_image_once() {
        let session = Session::new(OperatorCounts::new(1, 1, 1)).unwrap();
        let mut a = WickApp::new(session, missing_tools(), GraphicsSupport::Kitty);
        let mut buf = FrameBuffer::new(80, 24);
        a.paint(&mut buf);
        a.preview.show(PathBuf::from("/tmp/x.png"));

        let mut out = Vec::new();
        a.overlay(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("a=T,t=f,f=100"));

        let mut again = Vec::new();
        a.overlay(&mut again).unwrap();
        assert!(again.is_empty());

        feed(&mut a, &[code(KeyCode::Escape)]);
        assert_eq!(a.status, "Preview hidden.");
        let mut cleared = Vec::new();
        a.overlay(&mut cleared).unwrap();
        assert_eq!(cleared, b"\x1b_Ga=d,d=A,q=2;\x1b\\");
    }

    #[test]
    fn prompt_shows_cursor() {
        let mut a = abcd();
        let mut buf = FrameBuffer::new(80, 24);
        a.paint(&mut buf);
        assert!(a.cursor().is_none());
        feed(&mut a, &[press('i')]);
        a.paint(&mut buf);
        let (_, y, shape) = a.cursor().unwrap();
        assert_eq!(y, 23);
        assert_eq!(shape, CursorShape::SteadyBar);
    }
}
