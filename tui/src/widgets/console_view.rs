//! Console View Widget
//!
//! Draws the visible part of an [`AnimationSnapshot`] the way a terminal
//! would: prompt before commands, the typing cursor on the step being typed,
//! and a `❯` next to the highlighted menu option. The view sticks to the
//! bottom, so the newest line is always on screen.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use textwrap::wrap;

use console_core::{AnimationSnapshot, Step, StepClass, StepKind};

use crate::theme;

/// Marker in front of the highlighted menu option
pub const SELECTED_MARKER: &str = "❯ ";

/// Padding in front of the other options
pub const UNSELECTED_MARKER: &str = "  ";

/// Block cursor shown while typing
pub const CURSOR_GLYPH: &str = "▋";

/// Borderless view of the console's visible steps
pub struct ConsoleView<'a> {
    snapshot: &'a AnimationSnapshot,
    prompt: &'a str,
    show_cursor: bool,
}

impl<'a> ConsoleView<'a> {
    /// View of `snapshot` using `prompt` before commands
    #[must_use]
    pub fn new(snapshot: &'a AnimationSnapshot, prompt: &'a str) -> Self {
        Self {
            snapshot,
            prompt,
            show_cursor: true,
        }
    }

    /// Whether to draw the typing cursor (for blinking)
    #[must_use]
    pub fn show_cursor(mut self, show: bool) -> Self {
        self.show_cursor = show;
        self
    }
}

impl Widget for ConsoleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = usize::from(area.width);
        let lines: Vec<Line<'static>> = self
            .snapshot
            .visible_steps()
            .iter()
            .flat_map(|step| {
                step_lines(self.snapshot, step, self.prompt, Some(width), self.show_cursor)
            })
            .collect();

        // Stick to the bottom
        let skip = lines.len().saturating_sub(usize::from(area.height));
        for (row, line) in lines.iter().skip(skip).enumerate() {
            let Ok(offset) = u16::try_from(row) else {
                break;
            };
            buf.set_line(area.x, area.y + offset, line, area.width);
        }
    }
}

/// Lines for one step in its current state
///
/// Plain text (info, responses) is wrapped to `width` when given; banners and
/// command lines never wrap.
#[must_use]
pub fn step_lines(
    snapshot: &AnimationSnapshot,
    step: &Step,
    prompt: &str,
    width: Option<usize>,
    show_cursor: bool,
) -> Vec<Line<'static>> {
    let style = theme::step_style(step.kind, step.class);
    let typing = snapshot
        .is_typing_step(step.id)
        .then(|| snapshot.typing_text.as_str());

    match step.kind {
        StepKind::Command => {
            let mut spans = vec![Span::styled(prompt.to_string(), theme::prompt_style())];
            spans.extend(typed_spans(
                step.text.as_deref(),
                typing,
                style,
                show_cursor,
            ));
            vec![Line::from(spans)]
        }
        StepKind::Prompt => vec![Line::from(vec![
            Span::styled(prompt.to_string(), theme::prompt_style()),
            Span::styled(step.text.clone().unwrap_or_default(), style),
        ])],
        StepKind::Question => {
            let mut spans = vec![Span::styled(
                step.static_text.clone().unwrap_or_default(),
                theme::class_style(StepClass::Question),
            )];
            spans.extend(typed_spans(
                step.typed_text.as_deref(),
                typing,
                style,
                show_cursor,
            ));
            vec![Line::from(spans)]
        }
        StepKind::Banner => step
            .text
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(|line| Line::styled(line.to_string(), style))
            .collect(),
        StepKind::Info | StepKind::Response => {
            plain_lines(step.text.as_deref().unwrap_or_default(), style, width)
        }
        StepKind::Menu => step
            .menu_options
            .iter()
            .flatten()
            .map(|option| {
                let marker = if option.selected {
                    SELECTED_MARKER
                } else {
                    UNSELECTED_MARKER
                };
                Line::styled(
                    format!("{marker}{}", option.text),
                    theme::menu_option_style(option.selected),
                )
            })
            .collect(),
    }
}

/// Concatenated text of a line, without styling
#[must_use]
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// The typed part of a command or question
fn typed_spans(
    full: Option<&str>,
    typing: Option<&str>,
    style: Style,
    show_cursor: bool,
) -> Vec<Span<'static>> {
    match typing {
        Some(partial) => {
            let mut spans = vec![Span::styled(partial.to_string(), style)];
            if show_cursor {
                spans.push(Span::styled(
                    CURSOR_GLYPH,
                    Style::default().fg(theme::CURSOR),
                ));
            }
            spans
        }
        None => vec![Span::styled(full.unwrap_or_default().to_string(), style)],
    }
}

fn plain_lines(text: &str, style: Style, width: Option<usize>) -> Vec<Line<'static>> {
    if text.is_empty() {
        return vec![Line::default()];
    }

    text.lines()
        .flat_map(|line| match width {
            Some(width) if !line.is_empty() => wrap(line, width)
                .into_iter()
                .map(|cow| cow.into_owned())
                .collect(),
            _ => vec![line.to_string()],
        })
        .map(|line| Line::styled(line, style))
        .collect()
}
