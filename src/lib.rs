//! mobterm: terminal client for a store-driven multiplayer game.

pub mod core;
pub mod store;
pub mod tui;

#[cfg(test)]
pub mod test_support;
