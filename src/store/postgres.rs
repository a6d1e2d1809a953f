//! PostgreSQL-wire backend for the engine's database server.
//!
//! Column types are cast in SQL so decoding does not depend on how the
//! engine declared its tables. Joins are written explicitly, so no
//! server-specific session settings (such as implicit cross products) are needed.

use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{EntityInfo, MobId, StateStore, StoreError};

/// SQLSTATE for `serialization_failure`, raised on optimistic write conflicts.
const SERIALIZATION_FAILURE: &str = "40001";

const FIND_PLAYER_SQL: &str = "\
    SELECT p.id::INT8 FROM players p JOIN mobs m ON p.id = m.id \
    WHERE m.name = $1 ORDER BY p.id LIMIT 1";

const INSERT_MOB_SQL: &str = "\
    INSERT INTO mobs(kind, x, y, dir, name, sprite_id, minimap_icon) \
    VALUES ('player', 4, 4, 0, $1, 0, $2) RETURNING id::INT8";

const INSERT_PLAYER_SQL: &str = "INSERT INTO players(id) VALUES ($1)";

const FETCH_ENTITY_SQL: &str = "\
    SELECT m.name::TEXT, m.x::FLOAT8, m.y::FLOAT8, m.dir::FLOAT8 \
    FROM players p JOIN mobs m ON p.id = m.id WHERE p.id = $1";

const UPSERT_INPUT_SQL: &str = "\
    INSERT INTO inputs(player_id, action) VALUES ($1, $2) \
    ON CONFLICT (player_id) DO UPDATE SET action = EXCLUDED.action";

const FETCH_VIEWPORT_SQL: &str = "\
    SELECT full_row::TEXT FROM screen WHERE player_id = $1 ORDER BY y";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a small pool. `acquire_timeout` bounds connection checkout.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        info!("Connected to store");
        Ok(Self { pool })
    }
}

/// Classify a SQLSTATE code: serialization failures are conflicts.
fn classify_sqlstate(code: Option<&str>, message: String) -> StoreError {
    match code {
        Some(SERIALIZATION_FAILURE) => StoreError::Conflict,
        _ => StoreError::Database(message),
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned());
            classify_sqlstate(code.as_deref(), db.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

#[async_trait]
impl StateStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn resolve_or_create_player(&self, name: &str, icon: char) -> Result<MobId, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let existing: Option<(i64,)> = sqlx::query_as(FIND_PLAYER_SQL)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if let Some((id,)) = existing {
            tx.commit().await.map_err(map_sqlx_error)?;
            debug!("Found existing player {} ({})", id, name);
            return Ok(id);
        }

        let (id,): (i64,) = sqlx::query_as(INSERT_MOB_SQL)
            .bind(name)
            .bind(icon.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query(INSERT_PLAYER_SQL)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        info!("Created player {} ({})", id, name);
        Ok(id)
    }

    async fn fetch_entity(&self, id: MobId) -> Result<EntityInfo, StoreError> {
        let row: Option<(Option<String>, f64, f64, f64)> = sqlx::query_as(FETCH_ENTITY_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some((Some(name), x, y, dir)) if !name.is_empty() => Ok(EntityInfo { name, x, y, dir }),
            _ => Err(StoreError::NotFound),
        }
    }

    async fn upsert_input(&self, player_id: MobId, action: &str) -> Result<(), StoreError> {
        sqlx::query(UPSERT_INPUT_SQL)
            .bind(player_id)
            .bind(action)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn fetch_viewport(&self, viewer_id: MobId) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(FETCH_VIEWPORT_SQL)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(|(row,)| row.unwrap_or_default()).collect())
    }
}
