use crate::error::ConfigError;
use crate::viewport::Breakpoints;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Navigation layer configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub transition: TransitionConfig,
    pub viewport: Breakpoints,
    pub server: ServerConfig,
}

/// What to do with the mainframe when a fetch fails
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the previous content in place
    #[default]
    KeepStale,
    /// Replace the content with `error_fragment`
    ErrorFragment,
}

/// Transition timing and failure handling
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Fade-out time before the fetch is issued (milliseconds)
    pub fade_out_ms: u64,
    /// Time after the fade-in before new navigations are accepted (milliseconds)
    pub settle_ms: u64,
    /// A fetch still pending after this long counts as failed (milliseconds)
    pub fetch_timeout_ms: u64,
    /// Target shown on first load
    pub initial_target: String,
    pub failure_policy: FailurePolicy,
    /// Markup shown under `FailurePolicy::ErrorFragment`
    pub error_fragment: String,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            fade_out_ms: 800,
            settle_ms: 800,
            fetch_timeout_ms: 15_000,
            initial_target: "/files".to_string(),
            failure_policy: FailurePolicy::KeepStale,
            error_fragment: "404 Not Found".to_string(),
        }
    }
}

impl TransitionConfig {
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Where fragments are fetched from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "bzshare")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it is missing or broken
    pub fn load() -> Self {
        Self::load_or_default(Self::config_path().as_deref())
    }

    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => Self::load_from(path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "using default configuration");
                Config::default()
            }),
            _ => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&contents)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file if it doesn't exist
    pub fn create_default() -> Result<(), ConfigError> {
        match Self::config_path() {
            Some(path) => Self::create_default_at(&path),
            None => Ok(()),
        }
    }

    /// Write the defaults to `path` unless a file is already there
    pub fn create_default_at(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Config::default().save_to(path)?;
        }
        Ok(())
    }
}
