//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::core::config::{CliOverrides, MobtermConfig, ResolvedConfig, resolve_with_env};
use crate::tui::event::{KeySource, TermKey};
use crate::tui::terminal::{Renderer, TerminalMode};

/// Captures drawn frames as lines of text.
#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Vec<String>>,
    pub clears: usize,
    current: Vec<String>,
}

impl RecordingRenderer {
    pub fn last_frame(&self) -> Option<&Vec<String>> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn home(&mut self) -> io::Result<()> {
        self.current.clear();
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.current.push(text.to_string());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.frames.push(std::mem::take(&mut self.current));
        Ok(())
    }
}

/// Replays a fixed key script, then reports quit.
#[derive(Default)]
pub struct ScriptedKeys {
    script: VecDeque<Option<TermKey>>,
}

impl ScriptedKeys {
    pub fn new(script: Vec<Option<TermKey>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self, _timeout: Duration) -> io::Result<Option<TermKey>> {
        Ok(self.script.pop_front().unwrap_or(Some(TermKey::Char('q'))))
    }
}

/// Records `enter`/`leave` calls; can refuse to enter.
#[derive(Clone, Default)]
pub struct RecordingMode {
    pub log: Rc<RefCell<Vec<&'static str>>>,
    pub fail_enter: bool,
}

impl TerminalMode for RecordingMode {
    fn enter(&mut self) -> io::Result<()> {
        if self.fail_enter {
            return Err(io::Error::other("not a tty"));
        }
        self.log.borrow_mut().push("enter");
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.log.borrow_mut().push("leave");
        Ok(())
    }
}

/// Key source whose every poll fails, like a closed terminal.
pub struct BrokenKeys;

impl KeySource for BrokenKeys {
    fn poll_key(&mut self, _timeout: Duration) -> io::Result<Option<TermKey>> {
        Err(io::Error::other("input closed"))
    }
}

/// Default config with no environment leaking in.
pub fn test_config() -> ResolvedConfig {
    resolve_with_env(&MobtermConfig::default(), &CliOverrides::default(), |_| None)
}
