//! Menu Selection Animator
//!
//! Replays a [`MenuAnimation`] over the options of one menu step: for every
//! frame, wait one frame duration, then write the frame's highlight flags
//! into the driver's working copy of the step.

use tracing::{debug, trace};

use crate::catalog::{MenuAnimation, Step, StepId};
use crate::epoch::RunGuard;

/// Highlight replay for a single menu step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuSelectionAnimator {
    step_id: StepId,
    animation: MenuAnimation,
}

impl MenuSelectionAnimator {
    /// Animate `step_id` with the given timeline
    #[must_use]
    pub fn new(step_id: StepId, animation: MenuAnimation) -> Self {
        Self { step_id, animation }
    }

    /// Animator for a menu step that carries a timeline
    #[must_use]
    pub fn for_step(step: &Step) -> Option<Self> {
        step.menu_timeline()
            .map(|animation| Self::new(step.id, animation.clone()))
    }

    /// The step being animated
    #[must_use]
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Apply every frame in order
    ///
    /// Returns `true` once the last frame has been applied, or `false` as
    /// soon as `guard` goes stale. Frames are never applied to a stale run.
    pub async fn run(self, guard: &RunGuard) -> bool {
        let step_id = self.step_id;
        let frame_duration = self.animation.step_duration();

        debug!(
            step_id = %step_id,
            frames = self.animation.sequence.len(),
            frame_ms = self.animation.step_duration_ms,
            "Menu animation started"
        );

        for (index, frame) in self.animation.sequence.iter().enumerate() {
            if !guard.sleep(frame_duration).await {
                debug!(step_id = %step_id, frame = index, "Menu animation cancelled");
                return false;
            }

            let mut applied = false;
            if !guard.update(|s| applied = s.update_menu_selection(step_id, frame)) {
                return false;
            }
            trace!(step_id = %step_id, frame = index, applied, "Menu frame");
        }

        true
    }
}
