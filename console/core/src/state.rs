//! Animation State
//!
//! The single shared, reactive state of a mounted console widget.
//!
//! [`AnimationSnapshot`] is the plain data: which steps are visible, what is
//! being typed, and where the driver is in its cycle. [`AnimationState`] wraps
//! it in a `tokio::sync::watch` channel so surfaces can observe every change
//! without polling, while the driver and its two effects are the only
//! writers.
//!
//! Writes coming from a driver run are epoch-checked inside the channel's
//! lock (see [`crate::epoch::RunGuard`]), so a run that has been stopped can
//! never write again, even if its timer already fired.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::catalog::{Step, StepCatalog, StepId};

/// Where the driver is in its cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverPhase {
    /// Not running; nothing is scheduled
    #[default]
    Idle,
    /// Waiting out the warm-up delay before the first step
    WarmingUp,
    /// A typing effect is in flight
    Typing,
    /// Waiting out the current step's delay
    Delaying,
    /// Replaying a menu highlight sequence
    AnimatingMenu,
    /// Last step reached; waiting before the replay
    Complete,
    /// Stopped by the replay loop; a fresh start is scheduled
    RestartPending,
}

impl DriverPhase {
    /// Whether a run is in progress (and `start()` would be a no-op)
    #[must_use]
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Idle | Self::RestartPending)
    }
}

/// Plain data behind [`AnimationState`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnimationSnapshot {
    /// Index of the last visible step (`None` means nothing is visible)
    pub current_step_index: Option<usize>,
    /// Working copy of the catalog; menu selections are rewritten in place
    pub steps: Vec<Step>,
    /// Progressively revealed text of the step being typed
    pub typing_text: String,
    /// True only while a typing effect is in flight
    pub is_typing: bool,
    /// Step that `typing_text` belongs to
    pub current_typing_step_id: Option<StepId>,
    /// Driver phase
    pub phase: DriverPhase,
    /// Run generation, bumped on every start and stop
    pub epoch: u64,
}

impl AnimationSnapshot {
    /// Fresh state for a catalog: nothing visible, nothing typing
    #[must_use]
    pub fn new(catalog: &StepCatalog) -> Self {
        Self {
            current_step_index: None,
            steps: catalog.steps().to_vec(),
            typing_text: String::new(),
            is_typing: false,
            current_typing_step_id: None,
            phase: DriverPhase::Idle,
            epoch: 0,
        }
    }

    /// Steps from the start up to and including the current one
    #[must_use]
    pub fn visible_steps(&self) -> &[Step] {
        match self.current_step_index {
            Some(index) => &self.steps[..(index + 1).min(self.steps.len())],
            None => &[],
        }
    }

    /// Whether the current step is the last one
    ///
    /// An empty script is always complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match (self.current_step_index, self.steps.len().checked_sub(1)) {
            (_, None) => true,
            (Some(current), Some(last)) => current >= last,
            (None, Some(_)) => false,
        }
    }

    /// The step at the current index
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step_index?)
    }

    /// Advance by one step, clamped to the last index
    ///
    /// Returns `false` (and changes nothing) when already at the end.
    pub fn next_step(&mut self) -> bool {
        let next = self.current_step_index.map_or(0, |current| current + 1);
        if next < self.steps.len() {
            self.current_step_index = Some(next);
            true
        } else {
            false
        }
    }

    /// Back to the beginning of the script
    ///
    /// Hides every step, clears the typing fields and restores the menu
    /// selections of the catalog template.
    pub fn reset(&mut self, catalog: &StepCatalog) {
        self.current_step_index = None;
        self.typing_text.clear();
        self.is_typing = false;
        self.current_typing_step_id = None;
        self.steps.clear();
        self.steps.extend_from_slice(catalog.steps());
    }

    /// Apply a selection frame to the menu step with the given id
    ///
    /// Returns `false` if no such menu step exists.
    pub fn update_menu_selection(&mut self, step_id: StepId, selection: &[bool]) -> bool {
        self.steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .is_some_and(|step| step.apply_selection(selection))
    }

    /// Whether `step_id` is the step currently being typed
    #[must_use]
    pub fn is_typing_step(&self, step_id: StepId) -> bool {
        self.is_typing && self.current_typing_step_id == Some(step_id)
    }
}

/// Reactive holder of an [`AnimationSnapshot`]
///
/// Cheap to clone; all clones share the same channel. One instance exists
/// per mounted widget, owned by its [`crate::AnimationDriver`].
#[derive(Clone, Debug)]
pub struct AnimationState {
    tx: Arc<watch::Sender<AnimationSnapshot>>,
}

impl AnimationState {
    /// Create the state for a catalog
    #[must_use]
    pub fn new(catalog: &StepCatalog) -> Self {
        let (tx, _rx) = watch::channel(AnimationSnapshot::new(catalog));
        Self { tx: Arc::new(tx) }
    }

    /// Observe every change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnimationSnapshot> {
        self.tx.subscribe()
    }

    /// Clone of the current value
    #[must_use]
    pub fn snapshot(&self) -> AnimationSnapshot {
        self.tx.borrow().clone()
    }

    /// Read the current value without cloning
    ///
    /// The closure runs under the channel's read lock; keep it short and
    /// never await inside it.
    pub fn read<R>(&self, f: impl FnOnce(&AnimationSnapshot) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Index of the last visible step
    #[must_use]
    pub fn current_step_index(&self) -> Option<usize> {
        self.tx.borrow().current_step_index
    }

    /// Whether the last step is visible
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tx.borrow().is_complete()
    }

    /// Whether a typing effect is in flight
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.tx.borrow().is_typing
    }

    /// The progressively revealed text
    #[must_use]
    pub fn typing_text(&self) -> String {
        self.tx.borrow().typing_text.clone()
    }

    /// The step being typed
    #[must_use]
    pub fn current_typing_step_id(&self) -> Option<StepId> {
        self.tx.borrow().current_typing_step_id
    }

    /// Driver phase
    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        self.tx.borrow().phase
    }

    /// Current run generation
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    /// Conditionally modify the state; observers are only notified when the
    /// closure returns `true`
    pub(crate) fn transition(&self, f: impl FnOnce(&mut AnimationSnapshot) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Modify the state only if it still belongs to run `epoch`
    ///
    /// Returns `false` without touching anything when the run is stale.
    pub(crate) fn modify_if_current(
        &self,
        epoch: u64,
        f: impl FnOnce(&mut AnimationSnapshot),
    ) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.epoch != epoch {
                return false;
            }
            f(snapshot);
            true
        })
    }
}
