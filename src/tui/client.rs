//! # Client Loop
//!
//! One cooperative thread does everything, in this order per iteration:
//!
//! ```text
//! poll key (≤ poll_timeout) ─▶ update held key / view / quit
//!        │
//!        └─ tick due? ─▶ submit held action ─▶ fetch entity ─▶ fetch viewport ─▶ draw
//! ```
//!
//! Both fetches finish before anything is drawn, so a target that stops
//! resolving mid-tick never leaves a half-drawn or stale frame behind.
//! Store calls are individually time-bounded; no store failure ends the loop.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::core::config::ResolvedConfig;
use crate::core::input::{InputSampler, KeyCommand};
use crate::core::schedule::FrameScheduler;
use crate::core::view::ViewController;
use crate::store::{
    EntityInfo, MobId, RetryPolicy, StateStore, StoreError, SubmitOutcome, bounded, submit_action,
};
use crate::tui::event::{KeySource, TermKey};
use crate::tui::terminal::Renderer;
use crate::tui::ui::compose_frame;

/// What one loop iteration did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Quit,
    /// No tick was due.
    Idle,
    Ticked(TickReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// None when no key was held.
    pub submitted: Option<SubmitOutcome>,
    pub render: RenderOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Drawn { viewer_id: MobId, rows: usize },
    /// The target did not resolve; the view fell back to self and nothing was drawn.
    TargetLost(MobId),
    /// Some other store failure; nothing was drawn.
    StoreUnavailable(StoreError),
}

pub struct ClientLoop<R: Renderer, K: KeySource> {
    store: Arc<dyn StateStore>,
    renderer: R,
    keys: K,
    player_id: MobId,
    poll_timeout: Duration,
    store_timeout: Duration,
    retry: RetryPolicy,
    sampler: InputSampler,
    view: ViewController,
    scheduler: FrameScheduler,
}

impl<R: Renderer, K: KeySource> ClientLoop<R, K> {
    pub fn new(
        store: Arc<dyn StateStore>,
        renderer: R,
        keys: K,
        player_id: MobId,
        config: &ResolvedConfig,
        start: Instant,
    ) -> Self {
        Self {
            store,
            renderer,
            keys,
            player_id,
            poll_timeout: config.timing.poll_timeout,
            store_timeout: config.store_timeout,
            retry: RetryPolicy {
                attempts: config.submit_attempts,
                base_delay: config.retry_base_delay,
                call_timeout: config.store_timeout,
            },
            sampler: InputSampler::new(config.timing.hold_window),
            view: ViewController::new(player_id),
            scheduler: FrameScheduler::new(config.timing.frame_interval, start),
        }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn held_key(&self) -> Option<char> {
        self.sampler.held()
    }

    /// Run until the quit key. Only terminal I/O errors end the loop early.
    pub async fn run(&mut self) -> io::Result<()> {
        info!(
            "Client loop started for player {} (store: {}, frame: {:?})",
            self.player_id,
            self.store.name(),
            self.scheduler.interval()
        );
        self.renderer.clear_screen()?;
        loop {
            let key = self.keys.poll_key(self.poll_timeout)?;
            let now = Instant::now();
            if self.step(key, now).await? == Step::Quit {
                info!("Quit requested");
                return Ok(());
            }
        }
    }

    /// One iteration: apply `key` (if any), then tick if one is due at `now`.
    pub async fn step(&mut self, key: Option<TermKey>, now: Instant) -> io::Result<Step> {
        if let Some(key) = key
            && self.handle_key(key, now) == Step::Quit
        {
            return Ok(Step::Quit);
        }

        self.sampler.sample(now);

        if !self.scheduler.should_tick(now) {
            return Ok(Step::Idle);
        }
        self.tick(now).await.map(Step::Ticked)
    }

    fn handle_key(&mut self, key: TermKey, now: Instant) -> Step {
        let command = match key {
            TermKey::Interrupt => KeyCommand::Quit,
            TermKey::Char(c) => KeyCommand::classify(c),
        };
        match command {
            KeyCommand::Quit => return Step::Quit,
            KeyCommand::View(digit) => {
                self.view.select(digit);
                debug!("View switched to {:?}", self.view.state());
            }
            KeyCommand::Action(c) => self.sampler.press(c, now),
        }
        Step::Idle
    }

    async fn tick(&mut self, now: Instant) -> io::Result<TickReport> {
        // The clock advances even when the render is suppressed, keeping the submit cadence.
        self.scheduler.mark(now);

        let submitted = match self.sampler.held() {
            Some(key) => Some(
                submit_action(
                    self.store.as_ref(),
                    &self.retry,
                    self.player_id,
                    &key.to_string(),
                )
                .await,
            ),
            None => None,
        };

        let target = self.view.target();
        let render = match self.fetch_frame(target).await {
            Ok((entity, viewport)) => {
                self.draw(target, &entity, &viewport)?;
                RenderOutcome::Drawn {
                    viewer_id: target,
                    rows: viewport.len(),
                }
            }
            Err(StoreError::NotFound) => {
                if self.view.fall_back() {
                    info!("Cannot observe player {}, returning to self", target);
                } else {
                    warn!("Own player {} does not resolve", target);
                }
                RenderOutcome::TargetLost(target)
            }
            Err(e) => {
                warn!("Skipping frame for {}: {}", target, e);
                RenderOutcome::StoreUnavailable(e)
            }
        };

        Ok(TickReport { submitted, render })
    }

    async fn fetch_frame(&self, target: MobId) -> Result<(EntityInfo, Vec<String>), StoreError> {
        let entity = bounded(self.store_timeout, self.store.fetch_entity(target)).await?;
        let viewport = bounded(self.store_timeout, self.store.fetch_viewport(target)).await?;
        Ok((entity, viewport))
    }

    fn draw(&mut self, viewer_id: MobId, entity: &EntityInfo, viewport: &[String]) -> io::Result<()> {
        self.renderer.home()?;
        for line in compose_frame(viewer_id, entity, viewport) {
            self.renderer.line(&line)?;
        }
        self.renderer.finish()
    }
}
