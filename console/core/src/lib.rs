//! Console Core - Headless Scripted Console Animation for archi
//!
//! This crate replays the demo session of the `archi` scaffolding CLI: a
//! fixed script of commands, responses, info lines, a question and an
//! architecture menu, typed out and highlighted on a loop. It owns the
//! timing and the state; drawing is left to a surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Surfaces                              │
//! │        ┌───────────────┐          ┌────────────────┐          │
//! │        │ TUI (ratatui) │          │ Headless / CI  │          │
//! │        └───────┬───────┘          └───────┬────────┘          │
//! │                └──── watch::Receiver ─────┘                   │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ AnimationSnapshot
//! ┌──────────────────────────┴───────────────────────────────────┐
//! │                       CONSOLE CORE                            │
//! │  ┌────────────────────────────────────────────────────────┐   │
//! │  │                   AnimationDriver                       │   │
//! │  │  ┌─────────────┐  ┌──────────────┐  ┌────────────────┐  │   │
//! │  │  │ StepCatalog │  │ TypingEffect │  │ MenuSelection- │  │   │
//! │  │  │ (read-only) │  │              │  │ Animator       │  │   │
//! │  │  └─────────────┘  └──────┬───────┘  └───────┬────────┘  │   │
//! │  │                          └─── RunGuard ─────┘           │   │
//! │  │                                 │                        │   │
//! │  │                          AnimationState                  │   │
//! │  └────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use console_core::{AnimationDriver, DriverConfig, StepCatalog};
//!
//! #[tokio::main]
//! async fn main() {
//!     let driver = AnimationDriver::new(StepCatalog::builtin(), DriverConfig::default());
//!     let mut rx = driver.subscribe();
//!
//!     // Mount
//!     driver.start();
//!
//!     while rx.changed().await.is_ok() {
//!         let snapshot = rx.borrow_and_update().clone();
//!         println!("{} steps visible", snapshot.visible_steps().len());
//!     }
//!
//!     // Unmount
//!     driver.stop();
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`catalog`]: Steps, menu data and the compiled-in script
//! - [`state`]: Reactive animation state and driver phases
//! - [`epoch`]: Run guards that make stopped runs inert
//! - [`typing`]: Character-by-character reveal
//! - [`menu`]: Menu highlight replay
//! - [`driver`]: The run loop with `start()`/`stop()`
//! - [`config`]: TOML/environment/CLI configuration
//!
//! # No TUI Dependencies
//!
//! This crate has no dependency on ratatui, crossterm or any other UI
//! framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod driver;
pub mod epoch;
pub mod menu;
pub mod state;
pub mod typing;

// Re-exports for convenience
pub use catalog::{
    CatalogError, MenuAnimation, MenuOption, Step, StepCatalog, StepClass, StepId, StepKind,
    TypingPlan, DEFAULT_TYPING_SPEED_MS,
};
pub use driver::{AnimationDriver, DriverConfig};
pub use epoch::RunGuard;
pub use menu::MenuSelectionAnimator;
pub use state::{AnimationSnapshot, AnimationState, DriverPhase};
pub use typing::{TypingEffect, TypingOutcome};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, ConsoleConfig, ConsoleToml,
};
