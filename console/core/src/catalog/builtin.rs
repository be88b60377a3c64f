//! The compiled-in demo script: `archi -v`, `archi create`, the banner, the
//! environment report, the project-name question and the architecture menu.

use super::{MenuAnimation, MenuOption, Step, StepClass, StepId};

const BANNER: &str = r"    ___              __    _ _______ _____     _____ _      _____
   /   |  __________/ /_  (_)__   __/ ___/    / ____| |    |_   _|
  / /| | / ___/ ___/ __ \/ /  | |   \__\     | |    | |      | |
 / ___ |/ /  / /__/ / / / /   | |  ___/ /    | |____| |___  _| |_
/_/  |_/_/   \___/_/ /_/_/    |_| /____/      \_____|_____||_____|";

/// Milliseconds each frame of the architecture menu stays highlighted
const MENU_FRAME_MS: u64 = 800;

pub(super) fn steps() -> Vec<Step> {
    vec![
        // First command
        Step::command(StepId(1), "archi -v")
            .with_delay(100)
            .with_typing_speed(100),
        Step::response(StepId(2), "archi version 1.7.0")
            .with_delay(800)
            .with_class(StepClass::Version),
        // Second command
        Step::command(StepId(3), "archi create")
            .with_delay(1200)
            .with_typing_speed(100),
        Step::banner(StepId(4), BANNER)
            .with_delay(50)
            .with_class(StepClass::Banner),
        // Environment report
        info(5, "ArchiTS CLI: 1.7.0", Some(StepClass::Version)),
        info(6, "Node: v20.19.2", Some(StepClass::Node)),
        info(7, "Go: go1.22.2", Some(StepClass::Go)),
        info(8, "OS: linux", Some(StepClass::Os)),
        info(9, "", None),
        info(10, "Author: Thomas Bressel", Some(StepClass::Author)),
        info(
            11,
            "Architecture Generator for Backend Projects",
            Some(StepClass::Description),
        ),
        info(12, "", None),
        info(
            13,
            "🚀 ArchiTS CLI - Project Scaffolding",
            Some(StepClass::Highlight),
        ),
        info(14, "", None),
        // Project name
        Step::question(StepId(15), "Project Name: ", "mon-projet-backend")
            .with_delay(800)
            .with_typing_speed(100)
            .with_class(StepClass::Input),
        info(
            16,
            "Use the arrow keys to navigate: ↓ ↑ → ←",
            Some(StepClass::Navigation),
        ),
        info(17, "Select an architecture:", Some(StepClass::Question)),
        // Architecture menu
        Step::menu(
            StepId(18),
            vec![
                MenuOption::new("Layered Architecture", true),
                MenuOption::new("Clean Architecture", false),
                MenuOption::new("Hexagonal Architecture", false),
            ],
        )
        .with_delay(20)
        .with_menu_animation(MenuAnimation::new(
            vec![
                vec![true, false, false],
                vec![false, true, false],
                vec![false, false, true],
                vec![false, true, false],
            ],
            MENU_FRAME_MS,
        )),
    ]
}

/// Info lines all advance after 20ms
fn info(id: u32, text: &str, class: Option<StepClass>) -> Step {
    let step = Step::info(StepId(id), text).with_delay(20);
    match class {
        Some(class) => step.with_class(class),
        None => step,
    }
}
