//! TOML Configuration File Support
//!
//! Configuration for the typist lives at `~/.config/hive-typist/typist.toml`.
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
//! - `$XDG_CONFIG_HOME/hive-typist/typist.toml` (typically `~/.config/hive-typist/typist.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! typing_interval_ms = 150
//! delete_interval_ms = 100
//! typo_probability = 0.08
//! typo_hold_ms = 400
//! completion_hold_ms = 10000
//! fade_ms = 1000
//! settle_ms = 300
//!
//! [search]
//! endpoint = "https://api.pexels.com/v1"
//! api_key = "..."
//! per_page = 10
//! timeout_secs = 10
//!
//! [fallback]
//! template = "/img/hero-backgrounds/{word}.jpg"
//!
//! [[items]]
//! word = "Growth"
//! keyword = "growth"
//!
//! [[items]]
//! word = "Unity"
//! image = "/img/unity.png"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{AssetReference, ItemList, TextItem};
use crate::resolver::FallbackAsset;
use crate::search::SearchConfig;
use crate::timing::Timings;

/// Most results Pexels returns per page
pub const MAX_PER_PAGE: u32 = 80;

/// Words the hero banner cycles through out of the box
pub const DEFAULT_WORDS: [&str; 21] = [
    "Collaboration",
    "Synergy",
    "Teamwork",
    "Unity",
    "Partnership",
    "Innovation",
    "Creativity",
    "Growth",
    "Potential",
    "Excellence",
    "Progress",
    "Community",
    "Support",
    "Kindness",
    "Trust",
    "Knowledge",
    "Passion",
    "Purpose",
    "Impact",
    "Solutions",
    "Code",
];

/// Environment variables read by [`load_config`]
pub const ENV_VARS: [&str; 9] = [
    "TYPIST_TYPING_INTERVAL_MS",
    "TYPIST_DELETE_INTERVAL_MS",
    "TYPIST_TYPO_PROBABILITY",
    "TYPIST_TYPO_HOLD_MS",
    "TYPIST_COMPLETION_HOLD_MS",
    "TYPIST_FADE_MS",
    "TYPIST_SETTLE_MS",
    "TYPIST_PEXELS_API_KEY",
    "PEXELS_API_KEY",
];

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
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Delay between typed characters in milliseconds
    pub typing_interval_ms: Option<u64>,

    /// Delay between deleted characters in milliseconds
    pub delete_interval_ms: Option<u64>,

    /// Chance of a typo per eligible character (0.0-1.0)
    pub typo_probability: Option<f64>,

    /// How long a typo stays on screen in milliseconds
    pub typo_hold_ms: Option<u64>,

    /// How long a finished word is held in milliseconds
    pub completion_hold_ms: Option<u64>,

    /// Background fade-out in milliseconds
    pub fade_ms: Option<u64>,

    /// Pause before the next word in milliseconds
    pub settle_ms: Option<u64>,
}

/// Image search section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchToml {
    /// API root
    pub endpoint: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// Candidates requested per search
    pub per_page: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Fallback section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackToml {
    /// Path template; `{word}` becomes the lowercased word
    pub template: Option<String>,
}

/// One `[[items]]` entry
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemToml {
    /// Word to type
    pub word: String,

    /// Direct background reference
    pub image: Option<String>,

    /// Search keyword for the background
    pub keyword: Option<String>,
}

impl From<&ItemToml> for TextItem {
    fn from(item: &ItemToml) -> Self {
        Self {
            word: item.word.clone(),
            image_ref: item.image.as_deref().map(AssetReference::direct),
            keyword: item.keyword.clone(),
        }
    }
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypistToml {
    /// Timing configuration section
    pub timing: TimingToml,

    /// Image search configuration section
    pub search: SearchToml,

    /// Fallback configuration section
    pub fallback: FallbackToml,

    /// Item list; replaces the default words when present
    pub items: Option<Vec<ItemToml>>,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Default hero items: every word searched by its lowercase form
#[must_use]
pub fn default_items() -> ItemList {
    DEFAULT_WORDS
        .iter()
        .map(|word| TextItem::with_keyword(*word, word.to_lowercase()))
        .collect::<Vec<_>>()
        .into()
}

/// Centralized configuration for the typist
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct TypistConfigFile {
    /// Pacing for the hero banner
    pub timings: Timings,

    /// Image search connection settings
    pub search: SearchConfig,

    /// Fallback background template
    pub fallback: FallbackAsset,

    /// Items to cycle through
    pub items: ItemList,

    /// Seed for typo rolls (entropy when unset)
    pub seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for TypistConfigFile {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            search: SearchConfig::default(),
            fallback: FallbackAsset::default(),
            items: default_items(),
            seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl TypistConfigFile {
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

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.timings.typo_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::ValidationError(format!(
                "typo_probability must be between 0 and 1, got {p}"
            )));
        }
        if self.timings.typing_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "typing_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.timings.delete_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "delete_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.search.per_page == 0 || self.search.per_page > MAX_PER_PAGE {
            return Err(ConfigError::ValidationError(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.search.per_page
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/hive-typist/typist.toml` or
/// `~/.config/hive-typist/typist.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hive-typist").join("typist.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<TypistConfigFile, ConfigError> {
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
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<TypistConfigFile, ConfigError> {
    let mut config = TypistConfigFile::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: TypistToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                items = config.items.len(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut TypistConfigFile, toml: &TypistToml) {
    let timing = &toml.timing;
    if let Some(ms) = timing.typing_interval_ms {
        config.timings.typing_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.delete_interval_ms {
        config.timings.delete_interval = Duration::from_millis(ms);
    }
    if let Some(p) = timing.typo_probability {
        config.timings.typo_probability = p;
    }
    if let Some(ms) = timing.typo_hold_ms {
        config.timings.typo_hold = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.completion_hold_ms {
        config.timings.completion_hold = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.fade_ms {
        config.timings.fade = Duration::from_millis(ms);
    }
    if let Some(ms) = timing.settle_ms {
        config.timings.settle = Duration::from_millis(ms);
    }

    if let Some(ref endpoint) = toml.search.endpoint {
        config.search.endpoint = endpoint.clone();
    }
    if toml.search.api_key.is_some() {
        config.search.api_key = toml.search.api_key.clone();
    }
    if let Some(per_page) = toml.search.per_page {
        config.search.per_page = per_page;
    }
    if let Some(secs) = toml.search.timeout_secs {
        config.search.timeout = Duration::from_secs(secs);
    }

    if let Some(ref template) = toml.fallback.template {
        config.fallback = FallbackAsset::new(template.clone());
    }

    if let Some(ref items) = toml.items {
        config.items = items.iter().map(TextItem::from).collect::<Vec<_>>().into();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut TypistConfigFile) {
    apply_env_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from any variable lookup
///
/// Unparseable values are ignored and leave the previous value in place.
fn apply_env_from(config: &mut TypistConfigFile, var: impl Fn(&str) -> Option<String>) {
    let millis = |key: &str| var(key).and_then(|v| v.trim().parse::<u64>().ok());

    let durations: [(&str, &mut Duration); 6] = [
        ("TYPIST_TYPING_INTERVAL_MS", &mut config.timings.typing_interval),
        ("TYPIST_DELETE_INTERVAL_MS", &mut config.timings.delete_interval),
        ("TYPIST_TYPO_HOLD_MS", &mut config.timings.typo_hold),
        ("TYPIST_COMPLETION_HOLD_MS", &mut config.timings.completion_hold),
        ("TYPIST_FADE_MS", &mut config.timings.fade),
        ("TYPIST_SETTLE_MS", &mut config.timings.settle),
    ];
    let mut from_env = false;
    for (key, slot) in durations {
        if let Some(ms) = millis(key) {
            *slot = Duration::from_millis(ms);
            from_env = true;
        }
    }

    if let Some(p) = var("TYPIST_TYPO_PROBABILITY").and_then(|v| v.trim().parse::<f64>().ok()) {
        config.timings.typo_probability = p;
        from_env = true;
    }

    // The project-specific name wins over the provider's conventional one
    let api_key = var("TYPIST_PEXELS_API_KEY").or_else(|| var("PEXELS_API_KEY"));
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.search.api_key = Some(key);
        from_env = true;
    }

    if from_env {
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
    /// RNG seed override
    pub seed: Option<u64>,

    /// Typo probability override
    pub typo_probability: Option<f64>,

    /// Typing interval override (milliseconds)
    pub typing_interval_ms: Option<u64>,

    /// Disable image search (fallback backgrounds only)
    pub offline: bool,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set typo probability override
    #[must_use]
    pub fn with_typo_probability(mut self, probability: f64) -> Self {
        self.typo_probability = Some(probability);
        self
    }

    /// Set typing interval override
    #[must_use]
    pub fn with_typing_interval_ms(mut self, ms: u64) -> Self {
        self.typing_interval_ms = Some(ms);
        self
    }

    /// Run without an image search key
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut TypistConfigFile) {
        if self.seed.is_some()
            || self.typo_probability.is_some()
            || self.typing_interval_ms.is_some()
            || self.offline
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        if let Some(p) = self.typo_probability {
            config.timings.typo_probability = p;
        }

        if let Some(ms) = self.typing_interval_ms {
            config.timings.typing_interval = Duration::from_millis(ms);
        }

        if self.offline {
            config.search.api_key = None;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
