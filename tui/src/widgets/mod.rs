//! Widgets
//!
//! Borderless ratatui widgets for the console surface.

pub mod console_view;

pub use console_view::{line_text, step_lines, ConsoleView};
