//! In-process store backend.
//!
//! Holds the same four tables as the real store and plays the engine's
//! part for anything the client only reads: tests seed mobs and screen
//! rows directly. Faults (conflicts, hard failures, latency) can be
//! injected to exercise the client's error paths.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{EntityInfo, Mob, MobId, SPAWN_X, SPAWN_Y, StateStore, StoreError};

#[derive(Default)]
struct Tables {
    mobs: HashMap<MobId, Mob>,
    players: BTreeSet<MobId>,
    inputs: HashMap<MobId, String>,
    screen: HashMap<MobId, Vec<(i32, String)>>,
    next_id: MobId,
}

#[derive(Default)]
struct Faults {
    conflicts_remaining: u32,
    upsert_failure: Option<String>,
    latency: Option<Duration>,
    upsert_attempts: u32,
    submitted: Vec<(MobId, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn simulate_latency(&self) {
        let latency = self.faults().latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
    }

    // ------------------------------------------------------------------
    // Engine-side seeding
    // ------------------------------------------------------------------

    /// Insert or replace a mob. `player` also registers it in `players`.
    pub fn put_mob(&self, mob: Mob, player: bool) {
        let mut tables = self.tables();
        tables.next_id = tables.next_id.max(mob.id);
        if player {
            tables.players.insert(mob.id);
        }
        tables.mobs.insert(mob.id, mob);
    }

    pub fn remove_mob(&self, id: MobId) {
        let mut tables = self.tables();
        tables.mobs.remove(&id);
        tables.players.remove(&id);
        tables.screen.remove(&id);
    }

    /// Replace the screen rows for `viewer_id`. Rows may be given in any order.
    pub fn set_screen(&self, viewer_id: MobId, rows: Vec<(i32, String)>) {
        self.tables().screen.insert(viewer_id, rows);
    }

    // ------------------------------------------------------------------
    // Fault injection
    // ------------------------------------------------------------------

    /// The next `count` upserts fail with a write conflict.
    pub fn inject_conflicts(&self, count: u32) {
        self.faults().conflicts_remaining = count;
    }

    /// Every upsert fails with a non-conflict error until cleared.
    pub fn fail_upserts(&self, message: &str) {
        self.faults().upsert_failure = Some(message.to_string());
    }

    pub fn clear_faults(&self) {
        let mut faults = self.faults();
        faults.conflicts_remaining = 0;
        faults.upsert_failure = None;
        faults.latency = None;
    }

    /// Every call sleeps this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.faults().latency = Some(latency);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn input(&self, player_id: MobId) -> Option<String> {
        self.tables().inputs.get(&player_id).cloned()
    }

    pub fn input_row_count(&self, player_id: MobId) -> usize {
        usize::from(self.tables().inputs.contains_key(&player_id))
    }

    /// Upsert calls seen, including failed ones.
    pub fn upsert_attempts(&self) -> u32 {
        self.faults().upsert_attempts
    }

    /// Successful upserts, oldest first.
    pub fn submitted(&self) -> Vec<(MobId, String)> {
        self.faults().submitted.clone()
    }

    pub fn mob(&self, id: MobId) -> Option<Mob> {
        self.tables().mobs.get(&id).cloned()
    }

    pub fn mob_count(&self) -> usize {
        self.tables().mobs.len()
    }

    pub fn player_count(&self) -> usize {
        self.tables().players.len()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn resolve_or_create_player(&self, name: &str, icon: char) -> Result<MobId, StoreError> {
        self.simulate_latency().await;
        let mut tables = self.tables();
        let existing = tables
            .players
            .iter()
            .find(|id| tables.mobs.get(*id).is_some_and(|m| m.name == name))
            .copied();
        if let Some(id) = existing {
            return Ok(id);
        }

        tables.next_id += 1;
        let id = tables.next_id;
        tables.mobs.insert(
            id,
            Mob {
                id,
                kind: "player".to_string(),
                x: SPAWN_X,
                y: SPAWN_Y,
                dir: 0.0,
                name: name.to_string(),
                sprite_id: 0,
                minimap_icon: icon.to_string(),
            },
        );
        tables.players.insert(id);
        Ok(id)
    }

    async fn fetch_entity(&self, id: MobId) -> Result<EntityInfo, StoreError> {
        self.simulate_latency().await;
        let tables = self.tables();
        if !tables.players.contains(&id) {
            return Err(StoreError::NotFound);
        }
        let mob = tables.mobs.get(&id).ok_or(StoreError::NotFound)?;
        if mob.name.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(EntityInfo {
            name: mob.name.clone(),
            x: mob.x,
            y: mob.y,
            dir: mob.dir,
        })
    }

    async fn upsert_input(&self, player_id: MobId, action: &str) -> Result<(), StoreError> {
        {
            let mut faults = self.faults();
            faults.upsert_attempts += 1;
        }
        self.simulate_latency().await;

        let mut faults = self.faults();
        if faults.conflicts_remaining > 0 {
            faults.conflicts_remaining -= 1;
            return Err(StoreError::Conflict);
        }
        if let Some(message) = &faults.upsert_failure {
            return Err(StoreError::Database(message.clone()));
        }
        faults.submitted.push((player_id, action.to_string()));
        drop(faults);

        self.tables().inputs.insert(player_id, action.to_string());
        Ok(())
    }

    async fn fetch_viewport(&self, viewer_id: MobId) -> Result<Vec<String>, StoreError> {
        self.simulate_latency().await;
        let tables = self.tables();
        if !tables.mobs.contains_key(&viewer_id) {
            return Err(StoreError::NotFound);
        }
        let mut rows = tables.screen.get(&viewer_id).cloned().unwrap_or_default();
        rows.sort_by_key(|(y, _)| *y);
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}
