//! # Terminal Adapter
//!
//! Everything that touches the terminal: raw-mode ownership, key polling,
//! frame output, and the session wiring in [`run`].
//!
//! ## Session order
//!
//! 1. Prompt for name/icon (cooked mode, only for values not configured).
//! 2. Connect to the store and resolve the player id.
//! 3. Acquire raw mode; run the client loop; release raw mode ([`play`]).
//!
//! Steps 1 and 2 happen before the terminal mode changes, so their failures
//! need no restoration. Once step 3 begins, the guard restores the terminal
//! before `run` returns on every path, so errors are reported on a sane
//! terminal.

pub mod client;
pub mod event;
pub mod prompt;
pub mod terminal;
pub mod ui;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;

use crate::core::config::ResolvedConfig;
use crate::store::{MobId, PgStore, StateStore, StoreError, bounded};
use crate::tui::client::ClientLoop;
use crate::tui::event::{CrosstermKeys, KeySource};
use crate::tui::prompt::Identity;
use crate::tui::terminal::{CrosstermRenderer, RawMode, Renderer, TerminalGuard, TerminalMode};

/// Bound on connecting and resolving the player at startup.
const SETUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures that end a session.
#[derive(Debug)]
pub enum ClientError {
    /// Startup prompts could not be answered.
    Prompt(io::Error),
    /// Raw mode could not be acquired, or terminal output failed.
    Terminal(io::Error),
    /// The store was unreachable at startup.
    Store(StoreError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Prompt(e) => write!(f, "prompt failed: {e}"),
            ClientError::Terminal(e) => write!(f, "terminal error: {e}"),
            ClientError::Store(e) => write!(f, "cannot start session: {e}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        ClientError::Store(e)
    }
}

pub async fn run(config: ResolvedConfig) -> Result<(), ClientError> {
    let identity = prompt::identify(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        config.player_name.clone(),
        config.icon,
    )
    .map_err(ClientError::Prompt)?;

    let store = bounded(SETUP_TIMEOUT, PgStore::connect(&config.database_url, SETUP_TIMEOUT)).await?;
    let store: Arc<dyn StateStore> = Arc::new(store);
    let player_id = join(store.as_ref(), &identity).await?;

    play(
        RawMode,
        store,
        CrosstermRenderer::stdout(),
        CrosstermKeys,
        player_id,
        &config,
    )
    .await
}

/// Enter `mode`, run the client loop until quit, and leave `mode` before
/// returning. Terminal errors from the loop surface only after the restore.
pub async fn play<M, R, K>(
    mode: M,
    store: Arc<dyn StateStore>,
    renderer: R,
    keys: K,
    player_id: MobId,
    config: &ResolvedConfig,
) -> Result<(), ClientError>
where
    M: TerminalMode,
    R: Renderer,
    K: KeySource,
{
    let guard = TerminalGuard::acquire(mode).map_err(ClientError::Terminal)?;
    let mut client = ClientLoop::new(store, renderer, keys, player_id, config, Instant::now());
    let result = client.run().await;
    guard.release();
    result.map_err(ClientError::Terminal)
}

/// Resolve (or create) the player for `identity`.
pub async fn join(store: &dyn StateStore, identity: &Identity) -> Result<MobId, StoreError> {
    let id = bounded(
        SETUP_TIMEOUT,
        store.resolve_or_create_player(&identity.name, identity.icon),
    )
    .await?;
    info!("Playing as {} (id {}, icon {:?})", identity.name, id, identity.icon);
    Ok(id)
}
