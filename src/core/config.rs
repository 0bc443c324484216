//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.autoinstall/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::state::{DEFAULT_LOG_CAPACITY, DEFAULT_OUTPUT_CAPACITY};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InstallerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub interactive: Option<bool>,
    pub hold_on_exit: Option<bool>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PackagesConfig {
    pub primary: Option<Vec<String>>,
    pub aur: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Program plus leading arguments, e.g. `["sudo", "pacman"]`.
    pub primary: Option<Vec<String>>,
    pub alternate: Option<Vec<String>>,
    pub install_flag: Option<String>,
    pub confirm_flag: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub tick_ms: Option<u64>,
    pub log_capacity: Option<usize>,
    pub output_capacity: Option<usize>,
    pub visible_logs: Option<usize>,
    pub visible_output: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub poll_interval_ms: Option<u64>,
    pub startup_delay_ms: Option<u64>,
    pub package_delay_ms: Option<u64>,
    pub drain_timeout_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TICK_MS: u64 = 250;
pub const DEFAULT_VISIBLE_LOGS: usize = 15;
pub const DEFAULT_VISIBLE_OUTPUT: usize = 25;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 2000;
pub const DEFAULT_PACKAGE_DELAY_MS: u64 = 1000;
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_LOG_FILE: &str = "autoinstall.log";
pub const DEFAULT_INSTALL_FLAG: &str = "-S";
pub const DEFAULT_CONFIRM_FLAG: &str = "--noconfirm";

fn default_primary_tool() -> Vec<String> {
    vec!["sudo".to_string(), "pacman".to_string()]
}

fn default_alternate_tool() -> Vec<String> {
    vec!["yay".to_string()]
}

fn default_primary_packages() -> Vec<String> {
    vec!["git".to_string(), "base-devel".to_string()]
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub interactive: bool,
    pub hold_on_exit: bool,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub primary_packages: Vec<String>,
    pub aur_packages: Vec<String>,
    pub primary_tool: Vec<String>,
    pub alternate_tool: Vec<String>,
    pub install_flag: String,
    pub confirm_flag: String,
    pub tick: Duration,
    pub log_capacity: usize,
    pub output_capacity: usize,
    pub visible_logs: usize,
    pub visible_output: usize,
    pub poll_interval: Duration,
    pub startup_delay: Duration,
    pub package_delay: Duration,
    pub drain_timeout: Duration,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub primary_packages: Option<Vec<String>>,
    pub aur_packages: Option<Vec<String>>,
    pub interactive: Option<bool>,
    pub alternate_tool: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.autoinstall/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".autoinstall").join("config.toml"))
}

/// Load config from an explicit path, or from `~/.autoinstall/config.toml`.
///
/// A missing default file is generated and treated as empty. A missing
/// explicit file is an error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<InstallerConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(InstallerConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(InstallerConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<InstallerConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# autoinstall configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# interactive = true                 # relay keystrokes to confirmation prompts
# hold_on_exit = true                # keep the display open until Enter
# log_file = "autoinstall.log"
# log_level = "debug"                # or set AUTOINSTALL_LOG_LEVEL

# [packages]
# primary = ["git", "base-devel"]
# aur = ["visual-studio-code-bin"]

# [tools]
# primary = ["sudo", "pacman"]
# alternate = ["yay"]                # or set AUTOINSTALL_AUR_HELPER
# install_flag = "-S"
# confirm_flag = "--noconfirm"       # passed only in non-interactive mode

# [display]
# tick_ms = 250
# log_capacity = 500
# output_capacity = 1000
# visible_logs = 15
# visible_output = 25

# [timing]
# poll_interval_ms = 50
# startup_delay_ms = 2000
# package_delay_ms = 1000
# drain_timeout_ms = 2000
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &InstallerConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Interactive: CLI → env → config → default
    let interactive = cli
        .interactive
        .or_else(|| std::env::var("AUTOINSTALL_INTERACTIVE").ok().and_then(|v| parse_bool(&v)))
        .or(config.general.interactive)
        .unwrap_or(true);

    // AUR helper: CLI → env → config → default
    let alternate_tool = cli
        .alternate_tool
        .clone()
        .or_else(|| std::env::var("AUTOINSTALL_AUR_HELPER").ok())
        .map(|helper| helper.split_whitespace().map(str::to_string).collect())
        .or_else(|| config.tools.alternate.clone())
        .filter(|tool: &Vec<String>| !tool.is_empty())
        .unwrap_or_else(default_alternate_tool);

    // Log level: env → config → default
    let log_level = std::env::var("AUTOINSTALL_LOG_LEVEL")
        .ok()
        .or_else(|| config.general.log_level.clone())
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug);

    let primary_packages = cli
        .primary_packages
        .clone()
        .or_else(|| config.packages.primary.clone())
        .unwrap_or_else(default_primary_packages);

    let aur_packages = cli
        .aur_packages
        .clone()
        .or_else(|| config.packages.aur.clone())
        .unwrap_or_default();

    let primary_tool = config
        .tools
        .primary
        .clone()
        .filter(|tool| !tool.is_empty())
        .unwrap_or_else(default_primary_tool);

    let display = &config.display;
    let timing = &config.timing;

    ResolvedConfig {
        interactive,
        hold_on_exit: config.general.hold_on_exit.unwrap_or(true),
        log_file: config
            .general
            .log_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
            .into(),
        log_level,
        primary_packages,
        aur_packages,
        primary_tool,
        alternate_tool,
        install_flag: config
            .tools
            .install_flag
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTALL_FLAG.to_string()),
        confirm_flag: config
            .tools
            .confirm_flag
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIRM_FLAG.to_string()),
        tick: Duration::from_millis(display.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(10)),
        log_capacity: display.log_capacity.unwrap_or(DEFAULT_LOG_CAPACITY),
        output_capacity: display.output_capacity.unwrap_or(DEFAULT_OUTPUT_CAPACITY),
        visible_logs: display.visible_logs.unwrap_or(DEFAULT_VISIBLE_LOGS),
        visible_output: display.visible_output.unwrap_or(DEFAULT_VISIBLE_OUTPUT),
        poll_interval: Duration::from_millis(
            timing
                .poll_interval_ms
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                .max(1),
        ),
        startup_delay: Duration::from_millis(
            timing.startup_delay_ms.unwrap_or(DEFAULT_STARTUP_DELAY_MS),
        ),
        package_delay: Duration::from_millis(
            timing.package_delay_ms.unwrap_or(DEFAULT_PACKAGE_DELAY_MS),
        ),
        drain_timeout: Duration::from_millis(
            timing.drain_timeout_ms.unwrap_or(DEFAULT_DRAIN_TIMEOUT_MS),
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
