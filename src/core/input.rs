//! # Input Sampling
//!
//! Keystrokes arrive as discrete events, subject to the OS key-repeat delay.
//! The engine wants a steady "this action is being requested" signal instead,
//! so a pressed key stays *held* until `hold_window` passes without a repeat.
//!
//! ```text
//! press 'w'         repeat 'w'                     (no repeat)
//!    │                 │                                │
//!    ▼                 ▼                                ▼
//!    ├── held: w ──────┼── held: w ────────────────────┤ released
//!                                          hold_window ┘
//! ```

use std::time::{Duration, Instant};

/// What a single keystroke means to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// `q`/`Q` or Ctrl+C.
    Quit,
    /// A digit: switch the observed entity.
    View(u8),
    /// Anything else is forwarded verbatim to the engine.
    Action(char),
}

impl KeyCommand {
    pub fn classify(key: char) -> Self {
        match key {
            'q' | 'Q' => KeyCommand::Quit,
            '0'..='9' => KeyCommand::View(key as u8 - b'0'),
            other => KeyCommand::Action(other),
        }
    }
}

/// Turns a stream of keypresses into a held action with decay.
#[derive(Debug, Clone)]
pub struct InputSampler {
    held: Option<char>,
    last_key_time: Option<Instant>,
    hold_window: Duration,
}

impl InputSampler {
    pub fn new(hold_window: Duration) -> Self {
        Self {
            held: None,
            last_key_time: None,
            hold_window,
        }
    }

    /// Record a fresh press; it replaces whatever was held.
    pub fn press(&mut self, key: char, now: Instant) {
        self.held = Some(key);
        self.last_key_time = Some(now);
    }

    /// Current held key, releasing it once the hold window has lapsed.
    pub fn sample(&mut self, now: Instant) -> Option<char> {
        if let Some(last) = self.last_key_time
            && now.saturating_duration_since(last) > self.hold_window
        {
            self.held = None;
            self.last_key_time = None;
        }
        self.held
    }

    pub fn held(&self) -> Option<char> {
        self.held
    }
}
