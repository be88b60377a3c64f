//! Archi Console Entry Point
//!
//! Plays the scripted console full-screen, or writes it as a transcript.
//!
//! # Usage
//!
//! ```bash
//! # Full-screen, looping until `q`
//! archi-console
//!
//! # Print one cycle to stdout
//! archi-console --headless --cycles 1
//!
//! # Snapshot stream for tooling
//! archi-console --headless --json --cycles 1
//!
//! # Faster typing, logs to a file
//! archi-console --typing-speed-ms 40 --log-file /tmp/archi.log --log-level debug
//! ```

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console_core::{
    load_config, load_config_from_path, AnimationDriver, ConfigOverrides, ConsoleConfig,
    StepCatalog,
};
use console_tui::transcript::{run_headless, Transcript, TranscriptFormat};
use console_tui::App;

/// Archi Console - scripted terminal demo of the archi CLI
#[derive(Parser, Debug)]
#[command(name = "archi-console")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Write the transcript to stdout instead of drawing full-screen
    #[arg(long)]
    headless: bool,

    /// Stop after this many cycles (headless only; default: until Ctrl-C)
    #[arg(
        long,
        value_name = "N",
        requires = "headless",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    cycles: Option<u64>,

    /// Write one JSON snapshot per line (headless only)
    #[arg(long, requires = "headless")]
    json: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "ARCHI_CONSOLE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Wait before the first step (ms)
    #[arg(long, value_name = "MS")]
    warmup_ms: Option<u64>,

    /// Pause on the last step before replaying (ms)
    #[arg(long, value_name = "MS")]
    restart_pause_ms: Option<u64>,

    /// Default typing speed (ms per character)
    #[arg(long, value_name = "MS")]
    typing_speed_ms: Option<u64>,

    /// Prompt printed before commands
    #[arg(long)]
    prompt: Option<String>,

    /// Write logs to this file
    #[arg(long, env = "ARCHI_CONSOLE_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ARCHI_CONSOLE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ms) = self.warmup_ms {
            overrides = overrides.with_warmup_ms(ms);
        }
        if let Some(ms) = self.restart_pause_ms {
            overrides = overrides.with_restart_pause_ms(ms);
        }
        if let Some(ms) = self.typing_speed_ms {
            overrides = overrides.with_typing_speed_ms(ms);
        }
        if let Some(ref prompt) = self.prompt {
            overrides = overrides.with_prompt(prompt.clone());
        }
        overrides
    }
}

/// Initialize logging with the specified level
///
/// The full-screen UI owns stdout and stderr, so it only logs when a log
/// file is given.
fn init_logging(level: &str, log_file: Option<&PathBuf>, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "archi_console={level},console_tui={level},console_core={level}"
        ))
    });

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .init();
    } else if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }

    Ok(())
}

/// Resolve configuration: file, then environment, then CLI
fn resolve_config(args: &Args) -> Result<ConsoleConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            load_config_from_path(Some(path.clone()))?
        }
        None => load_config()?,
    };

    args.overrides()
        .apply(&mut config)
        .context("Invalid command line override")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_ref(), args.headless)?;

    let config = resolve_config(&args)?;
    info!(
        source = %config.source(),
        warmup_ms = config.driver.warmup.as_millis(),
        typing_speed_ms = config.driver.default_typing_speed_ms,
        "Configuration loaded"
    );

    let driver = AnimationDriver::new(StepCatalog::builtin(), config.driver.clone());

    if args.headless {
        let format = if args.json {
            TranscriptFormat::Json
        } else {
            TranscriptFormat::Plain
        };
        let transcript = Transcript::new(config.prompt.clone(), format);
        let mut stdout = io::stdout().lock();
        return run_headless(&driver, transcript, args.cycles, &mut stdout).await;
    }

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        let mut stderr = io::stderr();
        writeln!(stderr, "Error: archi-console requires a terminal (TTY)")?;
        writeln!(stderr, "Use --headless to print the transcript instead.")?;
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = App::new(driver, config.prompt).run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}
