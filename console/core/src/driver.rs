//! Animation Driver
//!
//! Owns the [`AnimationState`] of one mounted console and runs the script
//! against it.
//!
//! # Design
//!
//! Each `start()` spawns exactly one Tokio task that walks the catalog in an
//! explicit loop:
//!
//! ```text
//! warm-up -> step 0 -> [typing] -> delay -> advance -> [menu frames] -> ...
//!         -> last step -> Complete -> pause -> RestartPending -> gap -> start
//! ```
//!
//! Every wait and every state write of the task goes through the run's
//! [`RunGuard`]. `stop()` only has to bump the epoch: the task wakes from
//! whatever it is waiting on, sees that it is stale and returns without
//! writing anything.
//!
//! The restart at the end of a cycle is itself a `stop()` into
//! [`DriverPhase::RestartPending`] followed by a guarded `start()`. A host
//! that calls `start()` or `stop()` during the gap wins; the scheduled
//! restart then does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{StepCatalog, DEFAULT_TYPING_SPEED_MS};
use crate::epoch::RunGuard;
use crate::menu::MenuSelectionAnimator;
use crate::state::{AnimationSnapshot, AnimationState, DriverPhase};
use crate::typing::{TypingEffect, TypingOutcome};

/// Default wait between `start()` and the first step
pub const DEFAULT_WARMUP: Duration = Duration::from_millis(100);

/// Default pause on the last step before replaying
pub const DEFAULT_RESTART_PAUSE: Duration = Duration::from_millis(2000);

/// Default gap between the replay's stop and its start
pub const DEFAULT_RESTART_GAP: Duration = Duration::from_millis(200);

// =============================================================================
// Configuration
// =============================================================================

/// Driver timings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Wait between `start()` and the first step
    pub warmup: Duration,
    /// Pause on the last step before the replay
    pub restart_pause: Duration,
    /// Gap between the replay's stop and its start
    pub restart_gap: Duration,
    /// Typing speed for command steps that do not set one (ms per char)
    pub default_typing_speed_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            restart_pause: DEFAULT_RESTART_PAUSE,
            restart_gap: DEFAULT_RESTART_GAP,
            default_typing_speed_ms: DEFAULT_TYPING_SPEED_MS,
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Runs the console script and exposes its state
///
/// Dropping the driver stops it.
///
/// # Example
///
/// ```
/// use console_core::{AnimationDriver, DriverConfig, StepCatalog};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let driver = AnimationDriver::new(StepCatalog::builtin(), DriverConfig::default());
/// driver.start();
/// assert!(driver.is_running());
///
/// driver.shutdown().await;
/// assert!(!driver.is_running());
/// # }
/// ```
#[derive(Debug)]
pub struct AnimationDriver {
    inner: Arc<DriverInner>,
}

#[derive(Debug)]
struct DriverInner {
    catalog: StepCatalog,
    config: DriverConfig,
    state: AnimationState,
    task: Mutex<Option<JoinHandle<()>>>,
    cycles: AtomicU64,
}

impl AnimationDriver {
    /// Create an idle driver for `catalog`
    #[must_use]
    pub fn new(catalog: StepCatalog, config: DriverConfig) -> Self {
        let state = AnimationState::new(&catalog);
        Self {
            inner: Arc::new(DriverInner {
                catalog,
                config,
                state,
                task: Mutex::new(None),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    /// The observable state
    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.inner.state
    }

    /// Observe every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnimationSnapshot> {
        self.inner.state.subscribe()
    }

    /// The script being played
    #[must_use]
    pub fn catalog(&self) -> &StepCatalog {
        &self.inner.catalog
    }

    /// Driver timings
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.inner.config
    }

    /// Whether a run is in progress
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.phase().is_running()
    }

    /// Number of cycles started so far, replays included
    #[must_use]
    pub fn cycles_started(&self) -> u64 {
        self.inner.cycles.load(Ordering::Relaxed)
    }

    /// Begin (or resume after a stop) the animation loop
    ///
    /// Does nothing if a run is already in progress. Resets the state and
    /// shows step 0 after the warm-up delay.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) {
        DriverInner::start_run(&self.inner, None);
    }

    /// Halt the animation loop
    ///
    /// Every pending wait of the current run is invalidated. The visible
    /// state is left as it is. Calling `stop()` on an idle driver does
    /// nothing.
    pub fn stop(&self) {
        if let Some(epoch) = self.inner.halt(None, DriverPhase::Idle) {
            info!(epoch, "Console animation stopped");
        }
    }

    /// Stop and wait for the background task to exit
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Console animation task ended abnormally");
            }
        }
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(StepCatalog::builtin(), DriverConfig::default())
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Run loop
// =============================================================================

impl DriverInner {
    /// Start a run if none is in progress
    ///
    /// With `expected` set, only start if the state is still the
    /// `RestartPending` run with that epoch.
    fn start_run(inner: &Arc<Self>, expected: Option<u64>) -> bool {
        let mut epoch = 0;
        let started = inner.state.transition(|s| {
            if s.phase.is_running() {
                return false;
            }
            if let Some(expected) = expected {
                if s.epoch != expected || s.phase != DriverPhase::RestartPending {
                    return false;
                }
            }
            s.epoch += 1;
            epoch = s.epoch;
            s.reset(&inner.catalog);
            s.phase = DriverPhase::WarmingUp;
            true
        });

        if !started {
            debug!(replay = expected.is_some(), "Start ignored");
            return false;
        }

        let cycle = inner.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            epoch,
            cycle,
            steps = inner.catalog.len(),
            "Console animation started"
        );

        let guard = RunGuard::new(&inner.state, epoch);
        let runner = Arc::clone(inner);
        let handle = tokio::spawn(async move { runner.run(guard).await });

        // A replay is spawned from the previous run's own task, which exits
        // right after; its handle is simply detached.
        *inner.task.lock() = Some(handle);
        true
    }

    /// Bump the epoch and enter `phase`
    ///
    /// With `expected` set, only if the state still belongs to that run.
    /// Returns the new epoch, or `None` if nothing changed.
    fn halt(&self, expected: Option<u64>, phase: DriverPhase) -> Option<u64> {
        let mut halted = None;
        self.state.transition(|s| {
            match expected {
                Some(expected) if s.epoch != expected => return false,
                None if s.phase == DriverPhase::Idle => return false,
                _ => {}
            }
            s.epoch += 1;
            s.phase = phase;
            halted = Some(s.epoch);
            true
        });
        halted
    }

    async fn run(self: Arc<Self>, guard: RunGuard) {
        if !guard.sleep(self.config.warmup).await {
            return;
        }
        if !guard.update(|s| {
            s.next_step();
        }) {
            return;
        }

        if !self.play_steps(&guard).await {
            return;
        }

        self.finish_cycle(guard).await;
    }

    /// Process steps until the last one is visible
    ///
    /// Returns `false` if the run went stale on the way.
    async fn play_steps(&self, guard: &RunGuard) -> bool {
        loop {
            let (index, complete) = self
                .state
                .read(|s| (s.current_step_index, s.is_complete()));
            if complete {
                return true;
            }
            let Some(step) = index.and_then(|i| self.catalog.get(i)) else {
                return true;
            };

            if let Some(plan) = step.typing_plan(self.config.default_typing_speed_ms) {
                if !guard.update(|s| s.phase = DriverPhase::Typing) {
                    return false;
                }
                let effect = TypingEffect::from_plan(step.id, plan);
                if effect.run(guard).await == TypingOutcome::Cancelled {
                    return false;
                }
            }

            if !guard.update(|s| s.phase = DriverPhase::Delaying) {
                return false;
            }
            if !guard.sleep(step.delay()).await {
                return false;
            }

            let mut advanced_to = None;
            if !guard.update(|s| {
                if s.next_step() {
                    advanced_to = s.current_step_index;
                }
            }) {
                return false;
            }

            let Some(next) = advanced_to.and_then(|i| self.catalog.get(i)) else {
                continue;
            };
            debug!(
                epoch = guard.epoch(),
                index = advanced_to,
                step_id = %next.id,
                kind = ?next.kind,
                "Advanced"
            );

            if let Some(animator) = MenuSelectionAnimator::for_step(next) {
                if !guard.update(|s| s.phase = DriverPhase::AnimatingMenu) {
                    return false;
                }
                if !animator.run(guard).await {
                    return false;
                }
            }
        }
    }

    /// Hold the last step, then schedule the replay
    async fn finish_cycle(self: Arc<Self>, guard: RunGuard) {
        if !guard.update(|s| s.phase = DriverPhase::Complete) {
            return;
        }
        info!(epoch = guard.epoch(), "Console animation cycle complete");

        if !guard.sleep(self.config.restart_pause).await {
            return;
        }

        let Some(pending) = self.halt(Some(guard.epoch()), DriverPhase::RestartPending) else {
            return;
        };
        debug!(epoch = pending, "Replay scheduled");

        let gap = RunGuard::new(&self.state, pending);
        if !gap.sleep(self.config.restart_gap).await {
            debug!(epoch = pending, "Replay superseded");
            return;
        }

        Self::start_run(&self, Some(pending));
    }
}
