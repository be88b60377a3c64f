//! Typing Effect
//!
//! Reveals a string one character at a time into
//! [`AnimationSnapshot::typing_text`](crate::state::AnimationSnapshot::typing_text).
//!
//! # Timing
//!
//! The first character appears one full period after the effect starts and
//! the last one `len * speed` after it, still with `is_typing` set. The
//! typing flags are cleared on the following tick, so typing "ls" at
//! 10ms/char takes 30ms and observers always see the full text while it is
//! still being typed.
//!
//! A speed of zero reveals the whole text and clears the flags in a single
//! write. Empty text completes immediately. Characters are Unicode scalar values, so multi-byte
//! characters are never split.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::catalog::{StepId, TypingPlan};
use crate::epoch::RunGuard;

/// How a typing effect ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingOutcome {
    /// The whole text was revealed and the typing flags were cleared
    Completed,
    /// The run went stale; the state was left as it was
    Cancelled,
}

/// One progressive reveal of a step's text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingEffect {
    step_id: StepId,
    text: String,
    speed_ms: u64,
}

impl TypingEffect {
    /// Type `text` for `step_id` at `speed_ms` per character
    pub fn new(step_id: StepId, text: impl Into<String>, speed_ms: u64) -> Self {
        Self {
            step_id,
            text: text.into(),
            speed_ms,
        }
    }

    /// Effect for a step's typing plan
    #[must_use]
    pub fn from_plan(step_id: StepId, plan: TypingPlan<'_>) -> Self {
        Self::new(step_id, plan.text, plan.speed_ms)
    }

    /// The step being typed
    #[must_use]
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Total time the reveal takes
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.text.is_empty() {
            return Duration::ZERO;
        }
        let ticks = u64::try_from(self.text.chars().count())
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        Duration::from_millis(self.speed_ms.saturating_mul(ticks))
    }

    /// Run the effect to completion or until `guard` goes stale
    ///
    /// Completion is reported exactly once, through the return value.
    pub async fn run(self, guard: &RunGuard) -> TypingOutcome {
        let step_id = self.step_id;

        let begun = guard.update(|s| {
            s.is_typing = true;
            s.current_typing_step_id = Some(step_id);
            s.typing_text.clear();
        });
        if !begun {
            return TypingOutcome::Cancelled;
        }

        debug!(
            step_id = %step_id,
            chars = self.text.chars().count(),
            speed_ms = self.speed_ms,
            "Typing started"
        );

        if self.speed_ms == 0 || self.text.is_empty() {
            return finish(guard, step_id, Some(&self.text));
        }

        let period = Duration::from_millis(self.speed_ms);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for ch in self.text.chars() {
            if guard.until_stale(ticker.tick()).await.is_none() {
                debug!(step_id = %step_id, "Typing cancelled");
                return TypingOutcome::Cancelled;
            }
            if !guard.update(|s| s.typing_text.push(ch)) {
                return TypingOutcome::Cancelled;
            }
            trace!(step_id = %step_id, ch = %ch, "Typed");
        }

        // One more tick with the full text on screen
        if guard.until_stale(ticker.tick()).await.is_none() {
            debug!(step_id = %step_id, "Typing cancelled");
            return TypingOutcome::Cancelled;
        }
        drop(ticker);

        finish(guard, step_id, None)
    }
}

/// Append the remaining text and clear the typing flags in one write
fn finish(guard: &RunGuard, step_id: StepId, rest: Option<&str>) -> TypingOutcome {
    let done = guard.update(|s| {
        if let Some(rest) = rest {
            s.typing_text.push_str(rest);
        }
        s.is_typing = false;
        s.current_typing_step_id = None;
    });

    if done {
        debug!(step_id = %step_id, "Typing complete");
        TypingOutcome::Completed
    } else {
        TypingOutcome::Cancelled
    }
}
