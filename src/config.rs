// Configuration loading and parsing (config/tracker.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// tracker.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire tracker.toml file.
#[derive(Debug, Clone, Deserialize)]
struct TrackerFile {
    league: LeagueSection,
    rankings: RankingsSection,
    #[serde(default)]
    refresh: RefreshSection,
    #[serde(default)]
    sleeper: SleeperSection,
    #[serde(default)]
    cache: CacheSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSection {
    pub league_id: String,
    /// Optional: discovered from the league when omitted.
    #[serde(default)]
    pub draft_id: Option<String>,
    pub season: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingsSection {
    /// Path to the ranking CSV, relative to the config base dir when not
    /// absolute.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        RefreshSection {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SleeperSection {
    fn default() -> Self {
        SleeperSection {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Catalog cache directory; platform data dir when omitted.
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

impl Default for CacheSection {
    fn default() -> Self {
        CacheSection {
            dir: None,
            max_age_hours: default_max_age_hours(),
        }
    }
}

fn default_interval_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_age_hours() -> i64 {
    24
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueSection,
    pub rankings_path: PathBuf,
    pub refresh_interval: Duration,
    pub sleeper_base_url: Option<String>,
    pub sleeper_timeout: Duration,
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_hours: i64,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/tracker.toml` relative to
/// the given base dir.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_path = base_dir.join("config").join("tracker.toml");
    if !config_path.exists() {
        return Err(ConfigError::FileNotFound { path: config_path });
    }

    let text = std::fs::read_to_string(&config_path).map_err(|_| ConfigError::FileNotFound {
        path: config_path.clone(),
    })?;
    let file: TrackerFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: config_path,
        source: e,
    })?;

    let rankings_path = {
        let p = PathBuf::from(&file.rankings.path);
        if p.is_absolute() {
            p
        } else {
            base_dir.join(p)
        }
    };

    let config = Config {
        league: file.league,
        rankings_path,
        refresh_interval: Duration::from_secs(file.refresh.interval_secs),
        sleeper_base_url: file.sleeper.base_url,
        sleeper_timeout: Duration::from_secs(file.sleeper.timeout_secs),
        cache_dir: file.cache.dir.map(PathBuf::from),
        cache_max_age_hours: file.cache.max_age_hours,
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.league_id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.league_id".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.league.season.is_empty() || !config.league.season.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ConfigError::ValidationError {
            field: "league.season".to_string(),
            message: "must be a valid year".to_string(),
        });
    }
    if config.refresh_interval.as_secs() < 5 {
        return Err(ConfigError::ValidationError {
            field: "refresh.interval_secs".to_string(),
            message: "must be at least 5 seconds to respect API limits".to_string(),
        });
    }
    if config.sleeper_timeout.as_secs() == 0 {
        return Err(ConfigError::ValidationError {
            field: "sleeper.timeout_secs".to_string(),
            message: "must be at least 1 second".to_string(),
        });
    }
    if config.cache_max_age_hours <= 0 {
        return Err(ConfigError::ValidationError {
            field: "cache.max_age_hours".to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(())
}
