//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every section and
//! every field is optional; a missing file yields the built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SHELF_ROOT_FOLDER";

/// User agent sent to catalog APIs
pub fn get_user_agent() -> String {
    format!("Shelf/{} (personal book tracker)", env!("CARGO_PKG_VERSION"))
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Root folder for the cover cache and snapshot exports
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub goals: GoalsConfig,

    #[serde(default)]
    pub streak: StreakConfig,

    #[serde(default)]
    pub cover_cache: CoverCacheConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Catalog source endpoints and request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_google_books_url")]
    pub google_books_url: String,

    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,

    /// Google Books API key (anonymous quota when absent)
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size requested from each search endpoint
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    #[serde(default = "default_open_library_rps")]
    pub open_library_requests_per_second: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            google_books_url: default_google_books_url(),
            open_library_url: default_open_library_url(),
            google_api_key: None,
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            open_library_requests_per_second: default_open_library_rps(),
        }
    }
}

/// Reading goals; any goal left unset is not reported
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GoalsConfig {
    #[serde(default)]
    pub daily_pages: Option<u32>,

    #[serde(default)]
    pub weekly_pages: Option<u32>,

    /// Annual challenge: books to finish this year
    #[serde(default)]
    pub yearly_books: Option<u32>,
}

/// How often a streak freeze may be spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeWindowSetting {
    /// At most one freeze per ISO calendar week
    #[default]
    CalendarWeek,
    /// At most one freeze within any rolling window of `rolling_window_days`
    Rolling,
}

/// Streak freeze policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreakConfig {
    /// Freezes the user currently holds
    #[serde(default)]
    pub freezes_available: u32,

    #[serde(default)]
    pub freeze_window: FreezeWindowSetting,

    #[serde(default = "default_rolling_window_days")]
    pub rolling_window_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            freezes_available: 0,
            freeze_window: FreezeWindowSetting::default(),
            rolling_window_days: default_rolling_window_days(),
        }
    }
}

/// Cover image cache sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverCacheConfig {
    /// Entries kept in memory before the oldest is evicted
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

impl Default for CoverCacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_google_books_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_open_library_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_results() -> u32 {
    20
}

fn default_open_library_rps() -> u32 {
    3
}

fn default_rolling_window_days() -> u32 {
    7
}

fn default_memory_capacity() -> usize {
    50
}

/// Default configuration file path (`~/.config/shelf/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shelf").join("config.toml"))
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// No file at this path; built-in defaults in use
    Missing(PathBuf),
    /// No path given and no platform config folder
    Defaults,
}

impl ConfigOrigin {
    /// Report the origin; binaries call this once tracing is installed
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigOrigin::Missing(path) => warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            ),
            ConfigOrigin::Defaults => {
                warn!("No config folder on this platform, using built-in defaults")
            }
        }
    }
}

/// Read TOML config from `path` without logging
///
/// A missing file is not an error: defaults are returned with
/// `ConfigOrigin::Missing`. A file that exists but does not parse is
/// `Error::Config`.
pub fn read_toml_config(path: &Path) -> Result<(TomlConfig, ConfigOrigin)> {
    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigOrigin::Missing(path.to_path_buf())));
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    Ok((config, ConfigOrigin::File(path.to_path_buf())))
}

/// Load TOML config from `path`, logging where it came from
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let (config, origin) = read_toml_config(path)?;
    origin.log();
    Ok(config)
}

/// Load from an explicit path, or the platform default path, or defaults
///
/// Nothing is logged here: the logging setup itself comes from this config,
/// so callers report the returned origin after `init_logging`.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigOrigin)> {
    match explicit {
        Some(path) => read_toml_config(path),
        None => match default_config_path() {
            Some(path) => read_toml_config(&path),
            None => Ok((TomlConfig::default(), ConfigOrigin::Defaults)),
        },
    }
}

/// Root folder resolution, priority order:
/// 1. Command-line argument (highest priority)
/// 2. `SHELF_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent default (fallback)
pub struct RootFolderResolver<'a> {
    cli_arg: Option<PathBuf>,
    toml_config: Option<&'a TomlConfig>,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new() -> Self {
        Self {
            cli_arg: None,
            toml_config: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &'a TomlConfig) -> Self {
        self.toml_config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.toml_config.and_then(|c| c.root_folder.clone()) {
            return path;
        }

        default_root_folder()
    }
}

impl Default for RootFolderResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("shelf"))
        .unwrap_or_else(|| PathBuf::from("./shelf_data"))
}

/// Creates the root folder layout on first use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create root and cover directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(self.covers_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// On-disk tier of the cover cache
    pub fn covers_path(&self) -> PathBuf {
        self.root_folder.join("covers")
    }

    /// Default location of the library snapshot export
    pub fn snapshot_path(&self) -> PathBuf {
        self.root_folder.join("library.json")
    }
}
