//! Bounded optimistic retry for action submission.
//!
//! Only write conflicts are retried. Every other failure is logged and the
//! action is dropped for this tick; nothing here can stop the frame loop.

use std::time::Duration;

use log::{debug, warn};

use super::{MobId, StateStore, StoreError, bounded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first.
    pub attempts: u32,
    /// Sleep after the first conflict; doubles for each further conflict.
    pub base_delay: Duration,
    /// Bound on each individual store call.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(10),
            call_timeout: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Backoff after conflict number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Every sleep a fully conflicted submission performs, in order.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (1..self.attempts).map(|a| self.delay_after(a)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Applied { attempts: u32 },
    /// Every attempt hit a conflict. The action is skipped this tick.
    ConflictExhausted,
    /// A non-conflict error; no retry was made.
    Abandoned(StoreError),
}

/// Upsert `action` for `player_id`, retrying write conflicts with exponential backoff.
pub async fn submit_action(
    store: &dyn StateStore,
    policy: &RetryPolicy,
    player_id: MobId,
    action: &str,
) -> SubmitOutcome {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match bounded(policy.call_timeout, store.upsert_input(player_id, action)).await {
            Ok(()) => return SubmitOutcome::Applied { attempts: attempt },
            Err(StoreError::Conflict) => {
                debug!(
                    "Input conflict for player {} (attempt {}/{})",
                    player_id, attempt, attempts
                );
                if attempt < attempts {
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
            }
            Err(e) => {
                warn!("Dropping action {:?} for player {}: {}", action, player_id, e);
                return SubmitOutcome::Abandoned(e);
            }
        }
    }
    debug!("Action {:?} for player {} lost to conflicts", action, player_id);
    SubmitOutcome::ConflictExhausted
}
