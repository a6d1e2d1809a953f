//! # View Target
//!
//! Which entity the screen follows. Always starts on the local player and
//! snaps back to it whenever the observed entity stops resolving.
//!
//! ```text
//!              digit 1-9 (≠ self)
//!  WatchingSelf ─────────────────▶ WatchingOther(id)
//!       ▲                               │
//!       └───── 0 / own id / miss ───────┘
//! ```

use crate::store::MobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    WatchingSelf,
    WatchingOther(MobId),
}

#[derive(Debug, Clone)]
pub struct ViewController {
    self_id: MobId,
    state: ViewState,
}

impl ViewController {
    pub fn new(self_id: MobId) -> Self {
        Self {
            self_id,
            state: ViewState::WatchingSelf,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn self_id(&self) -> MobId {
        self.self_id
    }

    /// Id of the entity to fetch this tick.
    pub fn target(&self) -> MobId {
        match self.state {
            ViewState::WatchingSelf => self.self_id,
            ViewState::WatchingOther(id) => id,
        }
    }

    /// Apply a digit key.
    pub fn select(&mut self, digit: u8) {
        let id = MobId::from(digit);
        self.state = if digit == 0 || id == self.self_id {
            ViewState::WatchingSelf
        } else {
            ViewState::WatchingOther(id)
        };
    }

    /// The current target did not resolve. Returns true if the view changed.
    pub fn fall_back(&mut self) -> bool {
        let changed = self.state != ViewState::WatchingSelf;
        self.state = ViewState::WatchingSelf;
        changed
    }
}
