//! Step Catalog
//!
//! The ordered script the console replays. Each [`Step`] is one line (or
//! block) of the simulated terminal session and carries its own timing and
//! rendering metadata.
//!
//! The catalog is static at runtime. The only field that ever changes while
//! an animation is running is [`MenuOption::selected`], which the menu
//! selection animator rewrites in the driver's working copy of the steps.
//!
//! # Example
//!
//! ```
//! use console_core::catalog::{Step, StepCatalog, StepId};
//!
//! let catalog = StepCatalog::new(vec![
//!     Step::command(StepId(1), "ls").with_typing_speed(10).with_delay(50),
//!     Step::response(StepId(2), "done").with_delay(50),
//! ])
//! .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.last_index(), Some(1));
//! ```

mod builtin;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Typing speed used by command steps that do not set one (ms per character)
pub const DEFAULT_TYPING_SPEED_MS: u64 = 300;

// =============================================================================
// Identifiers and tags
// =============================================================================

/// Unique, stable identifier of a step within a catalog
///
/// Used to correlate in-flight typing and menu animations back to the step
/// they belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of step types; decides both rendering and animation behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Multi-line ASCII art
    Banner,
    /// Plain informational line
    Info,
    /// Bare prompt line
    Prompt,
    /// Shell command, typed out after the prompt
    Command,
    /// Output of a previous command
    Response,
    /// Interactive question with a static label and a typed answer
    Question,
    /// Selection menu with highlightable options
    Menu,
}

impl StepKind {
    /// Whether steps of this kind may run a typing effect
    #[must_use]
    pub fn is_typed(self) -> bool {
        matches!(self, Self::Command | Self::Question)
    }
}

/// Rendering class attached to a step
///
/// Surfaces map these to colors; the engine never looks at them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepClass {
    /// Version strings
    Version,
    /// The ASCII banner
    Banner,
    /// Node.js runtime line
    Node,
    /// Go toolchain line
    Go,
    /// Operating system line
    Os,
    /// Author credit
    Author,
    /// Tool description
    Description,
    /// Emphasized heading
    Highlight,
    /// User input (question answers)
    Input,
    /// Keyboard navigation hint
    Navigation,
    /// Question label
    Question,
}

// =============================================================================
// Menu data
// =============================================================================

/// One option of a menu step
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    /// Label shown to the user
    pub text: String,
    /// Whether the option is currently highlighted
    pub selected: bool,
}

impl MenuOption {
    /// Create a menu option
    pub fn new(text: impl Into<String>, selected: bool) -> Self {
        Self {
            text: text.into(),
            selected,
        }
    }
}

/// Fixed timeline of highlight snapshots replayed over a menu's options
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuAnimation {
    /// Selection frames, applied in order; index-aligned with the options
    pub sequence: Vec<Vec<bool>>,
    /// Time spent on each frame, in milliseconds
    pub step_duration_ms: u64,
}

impl MenuAnimation {
    /// Create a menu animation
    #[must_use]
    pub fn new(sequence: Vec<Vec<bool>>, step_duration_ms: u64) -> Self {
        Self {
            sequence,
            step_duration_ms,
        }
    }

    /// Per-frame duration
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }
}

// =============================================================================
// Step
// =============================================================================

/// One unit of the scripted console timeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Stable identifier
    pub id: StepId,
    /// Step type
    pub kind: StepKind,
    /// Main text (command line, info line, banner art, response)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Label printed before the typed answer of a question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_text: Option<String>,
    /// Answer typed out for a question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_text: Option<String>,
    /// Pause after this step's own processing, in milliseconds
    pub delay_ms: u64,
    /// Milliseconds per revealed character
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing_speed_ms: Option<u64>,
    /// Options of a menu step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_options: Option<Vec<MenuOption>>,
    /// Highlight timeline of a menu step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_animation: Option<MenuAnimation>,
    /// Rendering class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<StepClass>,
}

/// What a typing effect should reveal for a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingPlan<'a> {
    /// Text to reveal
    pub text: &'a str,
    /// Milliseconds per character
    pub speed_ms: u64,
}

impl Step {
    /// Create an empty step of the given kind
    #[must_use]
    pub fn new(id: StepId, kind: StepKind) -> Self {
        Self {
            id,
            kind,
            text: None,
            static_text: None,
            typed_text: None,
            delay_ms: 0,
            typing_speed_ms: None,
            menu_options: None,
            menu_animation: None,
            class: None,
        }
    }

    /// A command typed after the prompt
    pub fn command(id: StepId, text: impl Into<String>) -> Self {
        Self::new(id, StepKind::Command).with_text(text)
    }

    /// Output of a command
    pub fn response(id: StepId, text: impl Into<String>) -> Self {
        Self::new(id, StepKind::Response).with_text(text)
    }

    /// Informational line
    pub fn info(id: StepId, text: impl Into<String>) -> Self {
        Self::new(id, StepKind::Info).with_text(text)
    }

    /// ASCII art banner
    pub fn banner(id: StepId, text: impl Into<String>) -> Self {
        Self::new(id, StepKind::Banner).with_text(text)
    }

    /// Bare prompt line
    pub fn prompt(id: StepId, text: impl Into<String>) -> Self {
        Self::new(id, StepKind::Prompt).with_text(text)
    }

    /// Question with a static label and a typed answer
    pub fn question(
        id: StepId,
        static_text: impl Into<String>,
        typed_text: impl Into<String>,
    ) -> Self {
        let mut step = Self::new(id, StepKind::Question);
        step.static_text = Some(static_text.into());
        step.typed_text = Some(typed_text.into());
        step
    }

    /// Menu with the given options
    #[must_use]
    pub fn menu(id: StepId, options: Vec<MenuOption>) -> Self {
        let mut step = Self::new(id, StepKind::Menu);
        step.menu_options = Some(options);
        step
    }

    /// Set the main text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the post-step delay
    #[must_use]
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the typing speed
    #[must_use]
    pub fn with_typing_speed(mut self, speed_ms: u64) -> Self {
        self.typing_speed_ms = Some(speed_ms);
        self
    }

    /// Attach a menu highlight timeline
    #[must_use]
    pub fn with_menu_animation(mut self, animation: MenuAnimation) -> Self {
        self.menu_animation = Some(animation);
        self
    }

    /// Set the rendering class
    #[must_use]
    pub fn with_class(mut self, class: StepClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Post-step delay
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Decide whether (and what) this step types out
    ///
    /// Commands type their `text` at `typing_speed_ms`, falling back to
    /// `default_speed_ms`. Questions type `typed_text` only when they also
    /// carry an explicit typing speed. Anything else, or a typed step missing
    /// its text, returns `None` and the typing phase is skipped.
    #[must_use]
    pub fn typing_plan(&self, default_speed_ms: u64) -> Option<TypingPlan<'_>> {
        match self.kind {
            StepKind::Command => self.text.as_deref().map(|text| TypingPlan {
                text,
                speed_ms: self.typing_speed_ms.unwrap_or(default_speed_ms),
            }),
            StepKind::Question => match (self.typed_text.as_deref(), self.typing_speed_ms) {
                (Some(text), Some(speed_ms)) => Some(TypingPlan { text, speed_ms }),
                _ => None,
            },
            _ => None,
        }
    }

    /// The menu timeline, if this is a menu step that has one
    #[must_use]
    pub fn menu_timeline(&self) -> Option<&MenuAnimation> {
        if self.kind == StepKind::Menu {
            self.menu_animation.as_ref()
        } else {
            None
        }
    }

    /// Apply one selection frame to the menu options
    ///
    /// Options beyond the end of `frame` become unselected; extra frame
    /// entries are ignored. Returns `false` if the step has no options.
    pub fn apply_selection(&mut self, frame: &[bool]) -> bool {
        let Some(options) = self.menu_options.as_mut() else {
            return false;
        };
        for (index, option) in options.iter_mut().enumerate() {
            option.selected = frame.get(index).copied().unwrap_or(false);
        }
        true
    }

    /// Index of the highlighted menu option, if any
    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.menu_options
            .as_ref()?
            .iter()
            .position(|option| option.selected)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Errors raised when building a catalog
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two steps share the same id
    #[error("duplicate step id {id} at position {position}")]
    DuplicateStepId {
        /// The repeated id
        id: StepId,
        /// Position of the second occurrence
        position: usize,
    },
}

/// The full, ordered, static list of steps
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepCatalog {
    steps: Vec<Step>,
}

impl StepCatalog {
    /// Build a catalog, rejecting duplicate step ids
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateStepId`] if two steps share an id.
    pub fn new(steps: Vec<Step>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(steps.len());
        for (position, step) in steps.iter().enumerate() {
            if !seen.insert(step.id) {
                return Err(CatalogError::DuplicateStepId {
                    id: step.id,
                    position,
                });
            }
        }
        Ok(Self { steps })
    }

    /// The compiled-in demo script
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            steps: builtin::steps(),
        }
    }

    /// All steps in order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the catalog has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Step at a position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Step by id
    #[must_use]
    pub fn find(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = StepCatalog::new(vec![
            Step::info(StepId(1), "a"),
            Step::info(StepId(2), "b"),
            Step::info(StepId(1), "c"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            CatalogError::DuplicateStepId {
                id: StepId(1),
                position: 2
            }
        );
    }

    #[test]
    fn test_empty_catalog_has_no_last_index() {
        let catalog = StepCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.last_index(), None);
    }

    #[test]
    fn test_command_typing_defaults_speed() {
        let step = Step::command(StepId(1), "archi -v");
        let plan = step.typing_plan(DEFAULT_TYPING_SPEED_MS).unwrap();
        assert_eq!(plan.text, "archi -v");
        assert_eq!(plan.speed_ms, 300);

        let fast = Step::command(StepId(2), "ls").with_typing_speed(10);
        assert_eq!(fast.typing_plan(300).unwrap().speed_ms, 10);
    }

    #[test]
    fn test_malformed_typed_steps_skip_typing() {
        // Command without text
        assert!(Step::new(StepId(1), StepKind::Command)
            .typing_plan(300)
            .is_none());

        // Question without explicit speed
        assert!(Step::question(StepId(2), "Name: ", "x")
            .typing_plan(300)
            .is_none());

        // Question without typed text
        let mut question = Step::new(StepId(3), StepKind::Question).with_typing_speed(10);
        question.static_text = Some("Name: ".into());
        assert!(question.typing_plan(300).is_none());

        // Non-typed kinds never type
        assert!(Step::response(StepId(4), "ok")
            .with_typing_speed(10)
            .typing_plan(300)
            .is_none());
    }

    #[test]
    fn test_question_typing_plan() {
        let step = Step::question(StepId(15), "Project Name: ", "demo").with_typing_speed(100);
        let plan = step.typing_plan(300).unwrap();
        assert_eq!(plan.text, "demo");
        assert_eq!(plan.speed_ms, 100);
    }

    #[test]
    fn test_apply_selection_short_frame_defaults_unselected() {
        let mut step = Step::menu(
            StepId(1),
            vec![
                MenuOption::new("a", false),
                MenuOption::new("b", true),
                MenuOption::new("c", true),
            ],
        );

        assert!(step.apply_selection(&[true]));
        let selected: Vec<bool> = step
            .menu_options
            .as_ref()
            .unwrap()
            .iter()
            .map(|o| o.selected)
            .collect();
        assert_eq!(selected, vec![true, false, false]);
        assert_eq!(step.selected_option(), Some(0));
    }

    #[test]
    fn test_apply_selection_ignores_extra_entries() {
        let mut step = Step::menu(StepId(1), vec![MenuOption::new("only", false)]);
        assert!(step.apply_selection(&[false, true, true]));
        assert_eq!(step.selected_option(), None);
    }

    #[test]
    fn test_apply_selection_without_options() {
        let mut step = Step::info(StepId(1), "not a menu");
        assert!(!step.apply_selection(&[true]));
    }

    #[test]
    fn test_menu_timeline_only_for_menus() {
        let animation = MenuAnimation::new(vec![vec![true]], 100);
        let menu = Step::menu(StepId(1), vec![MenuOption::new("a", false)])
            .with_menu_animation(animation.clone());
        assert_eq!(menu.menu_timeline(), Some(&animation));

        let info = Step::info(StepId(2), "x").with_menu_animation(animation);
        assert_eq!(info.menu_timeline(), None);
    }

    #[test]
    fn test_step_serde_shape() {
        let step = Step::command(StepId(7), "ls")
            .with_delay(50)
            .with_class(StepClass::Version);
        let toml = toml::to_string(&step).unwrap();
        assert!(toml.contains("kind = \"command\""));
        assert!(toml.contains("class = \"version\""));
        assert!(!toml.contains("menu_options"));
        assert!(toml.contains("delay_ms = 50"));
    }
}
