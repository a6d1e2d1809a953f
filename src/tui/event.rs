use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

/// A keystroke the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKey {
    Char(char),
    /// Ctrl+C. Raw mode swallows the signal, so it arrives as a key.
    Interrupt,
}

/// Source of keystrokes, polled once per loop iteration.
pub trait KeySource {
    /// Wait at most `timeout` for one key.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<TermKey>>;
}

/// Reads keys from the terminal through crossterm.
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<TermKey>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                log::trace!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
                Ok(match (key_event.modifiers, key_event.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TermKey::Interrupt),
                    (_, KeyCode::Char(c)) => Some(TermKey::Char(c)),
                    _ => None,
                })
            }
            _ => Ok(None),
        }
    }
}
