//! # Terminal I/O
//!
//! Two capabilities, both swappable:
//!
//! - [`TerminalMode`]: enter/leave the non-echoing, character-at-a-time mode.
//!   [`TerminalGuard`] leaves it exactly once on every exit path, including
//!   early returns and unwinding panics.
//! - [`Renderer`]: cursor-home, clear-screen, and line output that erases
//!   whatever a longer previous line left behind.

use std::io::{self, Stdout, Write, stdout};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use log::{info, warn};
use unicode_width::UnicodeWidthChar;

pub trait TerminalMode {
    fn enter(&mut self) -> io::Result<()>;
    fn leave(&mut self) -> io::Result<()>;
}

/// Raw mode via crossterm. Echo and line buffering come back on `leave`.
pub struct RawMode;

impl TerminalMode for RawMode {
    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        info!("Terminal raw mode enabled");
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        let shown = execute!(stdout(), Show);
        terminal::disable_raw_mode()?;
        info!("Terminal mode restored");
        shown
    }
}

/// Scoped ownership of a [`TerminalMode`].
pub struct TerminalGuard<M: TerminalMode> {
    mode: M,
    active: bool,
}

impl<M: TerminalMode> TerminalGuard<M> {
    /// Enter the mode. On failure nothing was changed and nothing needs restoring.
    pub fn acquire(mut mode: M) -> io::Result<Self> {
        mode.enter()?;
        Ok(Self { mode, active: true })
    }

    /// Restore the terminal now instead of at drop.
    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.mode.leave() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

impl<M: TerminalMode> Drop for TerminalGuard<M> {
    fn drop(&mut self) {
        self.restore();
    }
}

pub trait Renderer {
    /// Move the cursor to the top-left corner.
    fn home(&mut self) -> io::Result<()>;
    /// Clear the whole screen and home the cursor.
    fn clear_screen(&mut self) -> io::Result<()>;
    /// Write one line, erase to end of line, move to the next line.
    fn line(&mut self, text: &str) -> io::Result<()>;
    /// Erase everything below the cursor and flush.
    fn finish(&mut self) -> io::Result<()>;
}

/// Escape-sequence renderer over any writer.
pub struct CrosstermRenderer<W: Write> {
    out: W,
    width: Option<u16>,
    /// Clip width for the frame in progress, looked up once in `home`.
    frame_columns: Option<usize>,
}

impl CrosstermRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(stdout())
    }
}

impl<W: Write> CrosstermRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: None,
            frame_columns: None,
        }
    }

    /// Fix the clipping width instead of asking the terminal.
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    fn columns(&self) -> Option<usize> {
        self.width
            .or_else(|| terminal::size().ok().map(|(cols, _)| cols))
            .map(usize::from)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for CrosstermRenderer<W> {
    fn home(&mut self) -> io::Result<()> {
        self.frame_columns = self.columns();
        queue!(self.out, MoveTo(0, 0))
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        let text = match self.frame_columns {
            Some(cols) => clip_to_width(text, cols),
            None => text,
        };
        // Raw mode disables output post-processing, so \n alone does not return the carriage.
        queue!(self.out, Print(text), Clear(ClearType::UntilNewLine), Print("\r\n"))
    }

    fn finish(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.out.flush()
    }
}

/// Longest prefix of `text` that fits in `columns` display cells.
pub fn clip_to_width(text: &str, columns: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > columns {
            return &text[..idx];
        }
        used += w;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingMode;

    #[test]
    fn test_guard_restores_on_drop() {
        let mode = RecordingMode::default();
        let log = mode.log.clone();
        {
            let _guard = TerminalGuard::acquire(mode).unwrap();
        }
        assert_eq!(*log.borrow(), vec!["enter", "leave"]);
    }

    #[test]
    fn test_explicit_release_restores_once() {
        let mode = RecordingMode::default();
        let log = mode.log.clone();
        let guard = TerminalGuard::acquire(mode).unwrap();
        guard.release();
        assert_eq!(*log.borrow(), vec!["enter", "leave"]);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let mode = RecordingMode::default();
        let log = mode.log.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TerminalGuard::acquire(mode).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec!["enter", "leave"]);
    }

    #[test]
    fn test_failed_acquire_restores_nothing() {
        let mode = RecordingMode {
            fail_enter: true,
            ..Default::default()
        };
        let log = mode.log.clone();
        assert!(TerminalGuard::acquire(mode).is_err());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_line_erases_to_end_of_line() {
        let mut renderer = CrosstermRenderer::new(Vec::new()).with_width(80);
        renderer.home().unwrap();
        renderer.line("hello").unwrap();
        renderer.finish().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(out.starts_with("\x1b[1;1H"));
        assert!(out.contains("hello\x1b[K\r\n"));
        assert!(out.ends_with("\x1b[J"));
    }

    #[test]
    fn test_line_clips_to_width_taken_at_home() {
        let mut renderer = CrosstermRenderer::new(Vec::new()).with_width(4);
        renderer.home().unwrap();
        // Later width changes apply from the next frame on
        renderer.width = Some(80);
        renderer.line("abcdef").unwrap();
        renderer.line("xy").unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(out.contains("abcd\x1b[K\r\n"));
        assert!(!out.contains("abcde"));
        assert!(out.contains("xy\x1b[K\r\n"));
    }

    #[test]
    fn test_clear_screen_homes_cursor() {
        let mut renderer = CrosstermRenderer::new(Vec::new()).with_width(80);
        renderer.clear_screen().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "\x1b[2J\x1b[1;1H");
    }

    #[test]
    fn test_clip_to_width() {
        assert_eq!(clip_to_width("abcdef", 4), "abcd");
        assert_eq!(clip_to_width("abc", 10), "abc");
        // Wide glyphs take two cells
        assert_eq!(clip_to_width("日本語", 5), "日本");
    }
}
