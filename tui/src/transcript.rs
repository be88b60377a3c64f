//! Headless Transcript
//!
//! Runs the console without a terminal and writes what a viewer would have
//! seen, one settled line at a time. Useful in CI, in pipes, and for
//! recording the script.
//!
//! A typed step is written once its typing is over (when a later step shows
//! up, or the cycle completes), with its full text. Every other step is
//! written as soon as it becomes visible. Menu highlight changes are written
//! as `❯ <option>` lines.
//!
//! In JSON mode every observed [`AnimationSnapshot`] is written as one JSON
//! object per line instead.

use std::collections::HashMap;
use std::io::Write;

use anyhow::Context;
use tracing::{debug, info};

use console_core::{
    AnimationDriver, AnimationSnapshot, DriverPhase, StepId, StepKind, DEFAULT_TYPING_SPEED_MS,
};

use crate::widgets::console_view::SELECTED_MARKER;
use crate::widgets::{line_text, step_lines};

/// Output flavour of the headless mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One snapshot per line
    Json,
}

/// Turns a stream of snapshots into transcript lines
#[derive(Debug)]
pub struct Transcript {
    prompt: String,
    format: TranscriptFormat,
    /// Number of visible steps already written
    written: usize,
    /// Last highlighted option written per menu
    menu_marks: HashMap<StepId, Option<usize>>,
}

impl Transcript {
    /// New transcript using `prompt` before commands
    pub fn new(prompt: impl Into<String>, format: TranscriptFormat) -> Self {
        Self {
            prompt: prompt.into(),
            format,
            written: 0,
            menu_marks: HashMap::new(),
        }
    }

    /// Lines to write for a newly observed snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be serialized in JSON mode.
    pub fn observe(&mut self, snapshot: &AnimationSnapshot) -> serde_json::Result<Vec<String>> {
        match self.format {
            TranscriptFormat::Json => Ok(vec![serde_json::to_string(snapshot)?]),
            TranscriptFormat::Plain => Ok(self.observe_plain(snapshot)),
        }
    }

    fn observe_plain(&mut self, snapshot: &AnimationSnapshot) -> Vec<String> {
        let visible = snapshot.visible_steps();
        let mut out = Vec::new();

        // Replay: the script was reset underneath us
        if visible.len() < self.written {
            self.written = 0;
            self.menu_marks.clear();
            out.push(String::new());
        }

        let settled_phase = matches!(
            snapshot.phase,
            DriverPhase::Complete | DriverPhase::RestartPending | DriverPhase::Idle
        );

        // Highlight changes on menus already written
        for step in &visible[..self.written] {
            if step.kind != StepKind::Menu {
                continue;
            }
            let selected = step.selected_option();
            let mark = self.menu_marks.entry(step.id).or_insert(selected);
            if *mark != selected {
                *mark = selected;
                if let Some(option) = selected.and_then(|i| step.menu_options.as_ref()?.get(i)) {
                    out.push(format!("{SELECTED_MARKER}{}", option.text));
                }
            }
        }

        while let Some(step) = visible.get(self.written) {
            let is_current = snapshot.current_step_index == Some(self.written);
            let typed = step.typing_plan(DEFAULT_TYPING_SPEED_MS).is_some();
            if is_current && typed && !settled_phase {
                break;
            }

            out.extend(
                step_lines(snapshot, step, &self.prompt, None, false)
                    .iter()
                    .map(line_text),
            );
            if step.kind == StepKind::Menu {
                self.menu_marks.insert(step.id, step.selected_option());
            }
            self.written += 1;
        }

        out
    }
}

/// Play the script headlessly and write the transcript to `out`
///
/// Stops after `cycles` completed cycles, or on Ctrl-C when `cycles` is
/// `None`. The driver is shut down before returning.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub async fn run_headless<W: Write>(
    driver: &AnimationDriver,
    mut transcript: Transcript,
    cycles: Option<u64>,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut rx = driver.subscribe();
    driver.start();

    let mut completed = 0u64;
    let mut last_phase = DriverPhase::Idle;

    loop {
        let snapshot = rx.borrow_and_update().clone();
        for line in transcript
            .observe(&snapshot)
            .context("Failed to serialize snapshot")?
        {
            writeln!(out, "{line}").context("Failed to write transcript")?;
        }

        if snapshot.phase == DriverPhase::Complete && last_phase != DriverPhase::Complete {
            completed += 1;
            info!(cycle = completed, "Cycle finished");
            if cycles.is_some_and(|limit| completed >= limit) {
                break;
            }
        }
        last_phase = snapshot.phase;

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    out.flush().context("Failed to flush transcript")?;
    driver.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::{MenuOption, Step, StepCatalog};
    use pretty_assertions::assert_eq;

    fn catalog() -> StepCatalog {
        StepCatalog::new(vec![
            Step::command(StepId(1), "ls"),
            Step::response(StepId(2), "done"),
            Step::menu(
                StepId(3),
                vec![MenuOption::new("a", false), MenuOption::new("b", false)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_typed_step_waits_for_typing_to_finish() {
        let mut transcript = Transcript::new("$ ", TranscriptFormat::Plain);
        let mut snapshot = AnimationSnapshot::new(&catalog());
        snapshot.phase = DriverPhase::Typing;
        snapshot.current_step_index = Some(0);
        snapshot.is_typing = true;
        snapshot.current_typing_step_id = Some(StepId(1));
        snapshot.typing_text = "l".into();

        assert!(transcript.observe(&snapshot).unwrap().is_empty());

        snapshot.is_typing = false;
        snapshot.current_typing_step_id = None;
        snapshot.current_step_index = Some(1);
        snapshot.phase = DriverPhase::Delaying;
        assert_eq!(transcript.observe(&snapshot).unwrap(), vec!["$ ls", "done"]);
    }

    #[test]
    fn test_menu_changes_are_written() {
        let mut transcript = Transcript::new("$ ", TranscriptFormat::Plain);
        let mut snapshot = AnimationSnapshot::new(&catalog());
        snapshot.current_step_index = Some(2);
        snapshot.phase = DriverPhase::AnimatingMenu;

        assert_eq!(
            transcript.observe(&snapshot).unwrap(),
            vec!["$ ls", "done", "  a", "  b"]
        );

        snapshot.update_menu_selection(StepId(3), &[false, true]);
        assert_eq!(transcript.observe(&snapshot).unwrap(), vec!["❯ b"]);

        // No change, nothing new
        assert!(transcript.observe(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_replay_starts_a_new_block() {
        let catalog = catalog();
        let mut transcript = Transcript::new("$ ", TranscriptFormat::Plain);
        let mut snapshot = AnimationSnapshot::new(&catalog);
        snapshot.current_step_index = Some(1);
        snapshot.phase = DriverPhase::Delaying;
        assert_eq!(transcript.observe(&snapshot).unwrap().len(), 2);

        snapshot.reset(&catalog);
        snapshot.phase = DriverPhase::WarmingUp;
        assert_eq!(transcript.observe(&snapshot).unwrap(), vec![""]);
    }

    #[test]
    fn test_json_lines() {
        let mut transcript = Transcript::new("$ ", TranscriptFormat::Json);
        let snapshot = AnimationSnapshot::new(&catalog());

        let lines = transcript.observe(&snapshot).unwrap();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["phase"], "idle");
        assert!(value["current_step_index"].is_null());
    }
}
