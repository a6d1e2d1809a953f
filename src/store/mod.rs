//! # Shared State Store
//!
//! The only door to shared state. The engine owns mobs and the rendered
//! screen; the client reads those and writes exactly one thing, the
//! per-player `inputs` row.
//!
//! ```text
//! players(id)
//! mobs(id, kind, x, y, dir, name, sprite_id, minimap_icon)
//! inputs(player_id UNIQUE, action)     ← client upserts
//! screen(player_id, y, full_row)       ← engine writes, client reads by y
//! ```
//!
//! Backends implement [`StateStore`] with single-attempt operations. Retry
//! and timeout policy live in [`retry`] so every backend gets the same
//! bounded behaviour.

pub mod memory;
pub mod postgres;
pub mod retry;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use retry::{RetryPolicy, SubmitOutcome, submit_action};

pub type MobId = i64;

/// Spawn point for newly created players.
pub const SPAWN_X: f64 = 4.0;
pub const SPAWN_Y: f64 = 4.0;

/// A positioned entity, as the engine stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mob {
    pub id: MobId,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub dir: f64,
    pub name: String,
    pub sprite_id: i64,
    pub minimap_icon: String,
}

/// Public metadata of an observed entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub dir: f64,
}

/// Errors a store operation can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Optimistic write conflict (serialization failure). Retryable.
    Conflict,
    /// The requested entity does not resolve.
    NotFound,
    /// The call exceeded its time bound. Not retried.
    Timeout(Duration),
    /// Anything else the backend reported. Not retried.
    Database(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "write conflict"),
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Timeout(limit) => write!(f, "store call timed out after {limit:?}"),
            StoreError::Database(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Look up the player called `name`, creating a player mob if none exists.
    async fn resolve_or_create_player(&self, name: &str, icon: char) -> Result<MobId, StoreError>;

    /// Name and position of player `id`, or `NotFound`.
    async fn fetch_entity(&self, id: MobId) -> Result<EntityInfo, StoreError>;

    /// One attempt at upserting the input row for `player_id`.
    async fn upsert_input(&self, player_id: MobId, action: &str) -> Result<(), StoreError>;

    /// Viewport rows for `viewer_id`, ascending by row index.
    async fn fetch_viewport(&self, viewer_id: MobId) -> Result<Vec<String>, StoreError>;
}

/// Run a store call with an upper bound on its duration.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
