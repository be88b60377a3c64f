//! TOML Configuration File Support
//!
//! Driver timings and the console prompt can be tuned without recompiling.
//! The script itself is compiled in and is not configurable.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at `$XDG_CONFIG_HOME/archi-console/console.toml`
//! (typically `~/.config/archi-console/console.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! warmup_ms = 100
//! restart_pause_ms = 2000
//! restart_gap_ms = 200
//! typing_speed_ms = 300
//!
//! [display]
//! prompt = "zisquier@kali:~$ "
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ARCHI_CONSOLE_WARMUP_MS` | `timing.warmup_ms` |
//! | `ARCHI_CONSOLE_RESTART_PAUSE_MS` | `timing.restart_pause_ms` |
//! | `ARCHI_CONSOLE_RESTART_GAP_MS` | `timing.restart_gap_ms` |
//! | `ARCHI_CONSOLE_TYPING_SPEED_MS` | `timing.typing_speed_ms` |
//! | `ARCHI_CONSOLE_PROMPT` | `display.prompt` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::DriverConfig;

/// Prompt printed before command steps
pub const DEFAULT_PROMPT: &str = "zisquier@kali:~$ ";

/// Upper bound for any single configured wait
pub const MAX_WAIT_MS: u64 = 10 * 60 * 1000;

/// Overrides `timing.warmup_ms`
pub const ENV_WARMUP_MS: &str = "ARCHI_CONSOLE_WARMUP_MS";
/// Overrides `timing.restart_pause_ms`
pub const ENV_RESTART_PAUSE_MS: &str = "ARCHI_CONSOLE_RESTART_PAUSE_MS";
/// Overrides `timing.restart_gap_ms`
pub const ENV_RESTART_GAP_MS: &str = "ARCHI_CONSOLE_RESTART_GAP_MS";
/// Overrides `timing.typing_speed_ms`
pub const ENV_TYPING_SPEED_MS: &str = "ARCHI_CONSOLE_TYPING_SPEED_MS";
/// Overrides `display.prompt`
pub const ENV_PROMPT: &str = "ARCHI_CONSOLE_PROMPT";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Wait before the first step, in milliseconds
    pub warmup_ms: Option<u64>,

    /// Pause on the last step before replaying, in milliseconds
    pub restart_pause_ms: Option<u64>,

    /// Gap between the replay's stop and start, in milliseconds
    pub restart_gap_ms: Option<u64>,

    /// Typing speed for commands without their own, in ms per character
    pub typing_speed_ms: Option<u64>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Prompt printed before command steps
    pub prompt: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleToml {
    /// Timing section
    pub timing: TimingToml,

    /// Display section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved console configuration
///
/// Use [`load_config`] to load it with proper priority handling.
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Driver timings
    pub driver: DriverConfig,

    /// Prompt printed before command steps
    pub prompt: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ConsoleConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the console cannot sensibly run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let waits = [
            ("warmup", self.driver.warmup),
            ("restart_pause", self.driver.restart_pause),
            ("restart_gap", self.driver.restart_gap),
            (
                "typing_speed",
                Duration::from_millis(self.driver.default_typing_speed_ms),
            ),
        ];
        for (name, wait) in waits {
            if wait > Duration::from_millis(MAX_WAIT_MS) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} of {}ms exceeds the {MAX_WAIT_MS}ms limit",
                    wait.as_millis()
                )));
            }
        }

        if self.prompt.contains(['\n', '\r']) {
            return Err(ConfigError::ValidationError(
                "prompt must fit on a single line".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/archi-console/console.toml` or
/// `~/.config/archi-console/console.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("archi-console").join("console.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI arguments are not handled here; apply [`ConfigOverrides`] after.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<ConsoleConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ConsoleConfig, ConfigError> {
    load_config_with_env(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
fn load_config_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ConsoleConfig, ConfigError> {
    let mut config = ConsoleConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: ConsoleToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConsoleConfig, toml: &ConsoleToml) {
    if let Some(ms) = toml.timing.warmup_ms {
        config.driver.warmup = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.restart_pause_ms {
        config.driver.restart_pause = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.restart_gap_ms {
        config.driver.restart_gap = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.typing_speed_ms {
        config.driver.default_typing_speed_ms = ms;
    }

    if let Some(ref prompt) = toml.display.prompt {
        config.prompt.clone_from(prompt);
    }
}

/// Apply environment variable overrides to the config
///
/// Unparseable numbers are logged and ignored.
fn apply_env_config(config: &mut ConsoleConfig, env: impl Fn(&str) -> Option<String>) {
    let millis = |key: &str| -> Option<u64> {
        let raw = env(key)?;
        match raw.trim().parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(e) => {
                tracing::warn!(var = key, value = %raw, error = %e, "Ignoring invalid value");
                None
            }
        }
    };

    if let Some(ms) = millis(ENV_WARMUP_MS) {
        config.driver.warmup = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = millis(ENV_RESTART_PAUSE_MS) {
        config.driver.restart_pause = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = millis(ENV_RESTART_GAP_MS) {
        config.driver.restart_gap = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = millis(ENV_TYPING_SPEED_MS) {
        config.driver.default_typing_speed_ms = ms;
        config.source = ConfigSource::Env;
    }
    if let Some(prompt) = env(ENV_PROMPT) {
        config.prompt = prompt;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Warm-up override (milliseconds)
    pub warmup_ms: Option<u64>,

    /// Restart pause override (milliseconds)
    pub restart_pause_ms: Option<u64>,

    /// Default typing speed override (ms per character)
    pub typing_speed_ms: Option<u64>,

    /// Prompt override
    pub prompt: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set warm-up override
    #[must_use]
    pub fn with_warmup_ms(mut self, ms: u64) -> Self {
        self.warmup_ms = Some(ms);
        self
    }

    /// Set restart pause override
    #[must_use]
    pub fn with_restart_pause_ms(mut self, ms: u64) -> Self {
        self.restart_pause_ms = Some(ms);
        self
    }

    /// Set typing speed override
    #[must_use]
    pub fn with_typing_speed_ms(mut self, ms: u64) -> Self {
        self.typing_speed_ms = Some(ms);
        self
    }

    /// Set prompt override
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warmup_ms.is_none()
            && self.restart_pause_ms.is_none()
            && self.typing_speed_ms.is_none()
            && self.prompt.is_none()
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply(&self, config: &mut ConsoleConfig) -> Result<(), ConfigError> {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.warmup_ms {
            config.driver.warmup = Duration::from_millis(ms);
        }
        if let Some(ms) = self.restart_pause_ms {
            config.driver.restart_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = self.typing_speed_ms {
            config.driver.default_typing_speed_ms = ms;
        }
        if let Some(ref prompt) = self.prompt {
            config.prompt.clone_from(prompt);
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();

        assert_eq!(config.driver.warmup, Duration::from_millis(100));
        assert_eq!(config.driver.restart_pause, Duration::from_millis(2000));
        assert_eq!(config.driver.restart_gap, Duration::from_millis(200));
        assert_eq!(config.driver.default_typing_speed_ms, 300);
        assert_eq!(config.prompt, "zisquier@kali:~$ ");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("archi-console/console.toml"));
        }
    }

    // =========================================================================
    // File Loading Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = toml_file(
            r#"
[timing]
warmup_ms = 50
restart_pause_ms = 1000
restart_gap_ms = 10
typing_speed_ms = 40

[display]
prompt = "$ "
"#,
        );

        let config = load_config_with_env(Some(file.path()), no_env).unwrap();

        assert_eq!(config.driver.warmup, Duration::from_millis(50));
        assert_eq!(config.driver.restart_pause, Duration::from_millis(1000));
        assert_eq!(config.driver.restart_gap, Duration::from_millis(10));
        assert_eq!(config.driver.default_typing_speed_ms, 40);
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = toml_file("[timing]\nwarmup_ms = 5\n");
        let config = load_config_with_env(Some(file.path()), no_env).unwrap();

        assert_eq!(config.driver.warmup, Duration::from_millis(5));
        assert_eq!(config.driver.restart_pause, Duration::from_millis(2000));
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = std::env::temp_dir().join("archi-console-does-not-exist.toml");
        let config = load_config_with_env(Some(&path), no_env).unwrap();

        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = toml_file("[timing\nwarmup_ms = ");
        let err = load_config_with_env(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let file = toml_file("[timing]\nwarmup_ms = \"soon\"\n");
        let err = load_config_with_env(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_out_of_range_file_value_rejected() {
        let file = toml_file("[timing]\nrestart_pause_ms = 99999999\n");
        let err = load_config_with_env(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("restart_pause")));
    }

    // =========================================================================
    // Priority Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("[timing]\nwarmup_ms = 50\ntyping_speed_ms = 40\n");
        let env = env_from(&[(ENV_WARMUP_MS, "75"), (ENV_PROMPT, "> ")]);

        let config = load_config_with_env(Some(file.path()), env).unwrap();

        assert_eq!(config.driver.warmup, Duration::from_millis(75));
        assert_eq!(config.driver.default_typing_speed_ms, 40);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_invalid_env_value_ignored() {
        let env = env_from(&[(ENV_RESTART_GAP_MS, "later")]);
        let config = load_config_with_env(None, env).unwrap();

        assert_eq!(config.driver.restart_gap, Duration::from_millis(200));
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let env = env_from(&[(ENV_TYPING_SPEED_MS, "20")]);
        let mut config = load_config_with_env(None, env).unwrap();
        assert_eq!(config.source(), ConfigSource::Env);

        ConfigOverrides::new()
            .with_typing_speed_ms(5)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.driver.default_typing_speed_ms, 5);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    // =========================================================================
    // ConfigOverrides Tests
    // =========================================================================

    #[test]
    fn test_config_overrides_builder() {
        let overrides = ConfigOverrides::new()
            .with_warmup_ms(10)
            .with_restart_pause_ms(500)
            .with_prompt("# ");

        assert_eq!(overrides.warmup_ms, Some(10));
        assert_eq!(overrides.restart_pause_ms, Some(500));
        assert_eq!(overrides.typing_speed_ms, None);
        assert_eq!(overrides.prompt.as_deref(), Some("# "));
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = ConsoleConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();

        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.driver, DriverConfig::default());
    }

    #[test]
    fn test_multiline_prompt_rejected() {
        let mut config = ConsoleConfig::default();
        let err = ConfigOverrides::new()
            .with_prompt("a\nb")
            .apply(&mut config)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_toml_round_trip() {
        let original = ConsoleToml {
            timing: TimingToml {
                warmup_ms: Some(1),
                restart_pause_ms: None,
                restart_gap_ms: Some(3),
                typing_speed_ms: None,
            },
            display: DisplayToml {
                prompt: Some("λ ".to_string()),
            },
        };

        let text = toml::to_string(&original).unwrap();
        let parsed: ConsoleToml = toml::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }
}
