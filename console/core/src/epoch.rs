//! Run Epochs
//!
//! Every `start()` and `stop()` bumps the epoch stored in the
//! [`AnimationState`]. A [`RunGuard`] remembers the epoch its run was started
//! with and is the only way that run touches time or state:
//!
//! - [`RunGuard::until_stale`] races a future against the epoch changing, so a
//!   pending timer is abandoned the moment the run is stopped.
//! - [`RunGuard::update`] writes to the state only if the epoch still matches,
//!   and the check happens under the same lock as the write.
//!
//! A stale run therefore never resurrects a stopped animation; it just finds
//! out the next time it looks and returns.

use std::future::Future;
use std::time::Duration;

use crate::state::{AnimationSnapshot, AnimationState};

/// Token tying one driver run to the state it animates
#[derive(Clone, Debug)]
pub struct RunGuard {
    epoch: u64,
    state: AnimationState,
}

impl RunGuard {
    /// Guard for run `epoch` of `state`
    #[must_use]
    pub fn new(state: &AnimationState, epoch: u64) -> Self {
        Self {
            epoch,
            state: state.clone(),
        }
    }

    /// Guard for whatever run currently owns `state`
    #[must_use]
    pub fn current(state: &AnimationState) -> Self {
        Self::new(state, state.epoch())
    }

    /// The epoch this guard belongs to
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the run is still the live one
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.state.epoch() == self.epoch
    }

    /// Modify the state if the run is still live
    ///
    /// Returns `false` (and does nothing) for a stale run.
    pub fn update(&self, f: impl FnOnce(&mut AnimationSnapshot)) -> bool {
        self.state.modify_if_current(self.epoch, f)
    }

    /// Drive `fut` unless the run goes stale first
    ///
    /// Returns `None` if the epoch changed before or while `fut` was pending;
    /// `fut` is dropped in that case.
    pub async fn until_stale<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_current() {
            return None;
        }

        let epoch = self.epoch;
        let mut rx = self.state.subscribe();
        let invalidated = async move {
            // A closed channel also ends the run
            let _ = rx.wait_for(|snapshot| snapshot.epoch != epoch).await;
        };

        tokio::select! {
            biased;
            () = invalidated => None,
            output = fut => self.is_current().then_some(output),
        }
    }

    /// Sleep for `duration`; `false` means the run went stale meanwhile
    pub async fn sleep(&self, duration: Duration) -> bool {
        self.until_stale(tokio::time::sleep(duration)).await.is_some()
    }
}
