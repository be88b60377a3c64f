//! Theme and Colors
//!
//! A Kali-style terminal palette: green prompt, cyan banner, muted info
//! lines, and one accent per rendering class.

use ratatui::style::{Color, Modifier, Style};

use console_core::{StepClass, StepKind};

// ============================================================================
// Terminal Palette
// ============================================================================

/// Prompt user@host part
pub const PROMPT_GREEN: Color = Color::Rgb(80, 250, 123);

/// Typed commands and answers
pub const COMMAND_WHITE: Color = Color::Rgb(240, 240, 240);

/// Command output
pub const RESPONSE_GRAY: Color = Color::Rgb(190, 190, 190);

/// Plain info lines
pub const INFO_GRAY: Color = Color::Rgb(150, 150, 150);

/// ASCII banner
pub const BANNER_CYAN: Color = Color::Rgb(97, 214, 214);

/// Typing cursor
pub const CURSOR: Color = Color::Rgb(80, 250, 123);

/// Status bar and other chrome
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

// ============================================================================
// Class Accents
// ============================================================================

/// Version strings
pub const VERSION_YELLOW: Color = Color::Rgb(241, 250, 140);

/// Node.js line
pub const NODE_GREEN: Color = Color::Rgb(104, 160, 99);

/// Go line
pub const GO_BLUE: Color = Color::Rgb(0, 173, 216);

/// OS line
pub const OS_PURPLE: Color = Color::Rgb(189, 147, 249);

/// Author credit
pub const AUTHOR_PINK: Color = Color::Rgb(255, 121, 198);

/// Highlighted heading
pub const HIGHLIGHT_ORANGE: Color = Color::Rgb(255, 184, 108);

/// Selected menu option
pub const MENU_SELECTED: Color = Color::Rgb(97, 214, 214);

// ============================================================================
// Styles
// ============================================================================

/// Base style for a step's main text
#[must_use]
pub fn step_style(kind: StepKind, class: Option<StepClass>) -> Style {
    if let Some(class) = class {
        return class_style(class);
    }
    match kind {
        StepKind::Banner => Style::default().fg(BANNER_CYAN),
        StepKind::Command | StepKind::Prompt => Style::default().fg(COMMAND_WHITE),
        StepKind::Response => Style::default().fg(RESPONSE_GRAY),
        StepKind::Info | StepKind::Question | StepKind::Menu => Style::default().fg(INFO_GRAY),
    }
}

/// Style for a rendering class
#[must_use]
pub fn class_style(class: StepClass) -> Style {
    match class {
        StepClass::Version => Style::default().fg(VERSION_YELLOW),
        StepClass::Banner => Style::default()
            .fg(BANNER_CYAN)
            .add_modifier(Modifier::BOLD),
        StepClass::Node => Style::default().fg(NODE_GREEN),
        StepClass::Go => Style::default().fg(GO_BLUE),
        StepClass::Os => Style::default().fg(OS_PURPLE),
        StepClass::Author => Style::default().fg(AUTHOR_PINK),
        StepClass::Description => Style::default()
            .fg(INFO_GRAY)
            .add_modifier(Modifier::ITALIC),
        StepClass::Highlight => Style::default()
            .fg(HIGHLIGHT_ORANGE)
            .add_modifier(Modifier::BOLD),
        StepClass::Input => Style::default().fg(COMMAND_WHITE),
        StepClass::Navigation => Style::default().fg(DIM_GRAY),
        StepClass::Question => Style::default()
            .fg(PROMPT_GREEN)
            .add_modifier(Modifier::BOLD),
    }
}

/// Prompt before commands
#[must_use]
pub fn prompt_style() -> Style {
    Style::default()
        .fg(PROMPT_GREEN)
        .add_modifier(Modifier::BOLD)
}

/// Menu option, highlighted or not
#[must_use]
pub fn menu_option_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(MENU_SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(INFO_GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_overrides_kind() {
        let style = step_style(StepKind::Response, Some(StepClass::Version));
        assert_eq!(style.fg, Some(VERSION_YELLOW));
    }

    #[test]
    fn test_unclassed_banner_is_cyan() {
        assert_eq!(step_style(StepKind::Banner, None).fg, Some(BANNER_CYAN));
    }

    #[test]
    fn test_selected_option_stands_out() {
        assert_ne!(menu_option_style(true), menu_option_style(false));
    }
}
