//! Archi Console TUI - Terminal front end for the scripted console
//!
//! This crate mounts a [`console_core::AnimationDriver`] and draws it as a
//! fake terminal session: prompt, typed commands, command output, and an
//! animated selection menu.
//!
//! # Architecture
//!
//! - **App**: Full-screen event loop (keys, redraws, mount/unmount)
//! - **Widgets**: Borderless console view that sticks to the bottom
//! - **Theme**: Kali-style palette and per-class styles
//! - **Transcript**: Headless mode writing settled lines or JSON snapshots

pub mod app;
pub mod theme;
pub mod transcript;
pub mod widgets;

pub use app::App;
