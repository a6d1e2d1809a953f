//! # Core Client Logic
//!
//! Client-local state that knows nothing about the terminal or the store
//! backend. Every function here takes `now` as an argument so timing
//! behaviour can be driven from tests.
//!
//! ```text
//!   keys ──▶ input::InputSampler ──▶ held action ──┐
//!                                                   ├──▶ ClientLoop (tui)
//!   digits ─▶ view::ViewController ─▶ target id ───┘
//!                       schedule::FrameScheduler gates each tick
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layered configuration, resolved once at startup
//! - [`input`]: key classification and the held-key decay window
//! - [`schedule`]: fixed-cadence tick gating
//! - [`view`]: which entity the screen follows

pub mod config;
pub mod input;
pub mod schedule;
pub mod view;
