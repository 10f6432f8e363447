use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::grouping::DEFAULT_SKIP_TOKENS;
use crate::listing::Site;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Sites that should be ingested.
    pub fn enabled_sites(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.iter().filter(|s| s.enabled)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("titler.db")
}

/// A site whose saved listing pages are ingested
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Which layout the pages use
    pub site: Site,
    /// Directory holding the saved `*.html` listing pages
    pub pages_dir: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Title grouping configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupingConfig {
    /// Lower-case tokens that mark a movie release as not worth watching
    #[serde(default = "default_skip_tokens")]
    pub skip_tokens: Vec<String>,
    /// Fill record media fields from release names
    #[serde(default)]
    pub enrich_media: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            skip_tokens: default_skip_tokens(),
            enrich_media: false,
        }
    }
}

fn default_skip_tokens() -> Vec<String> {
    DEFAULT_SKIP_TOKENS.iter().map(|t| t.to_string()).collect()
}

/// Page fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Pause after the first failure (default: 5)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// Added to the pause after every further failure (default: 1)
    #[serde(default = "default_retry_jitter")]
    pub retry_jitter_secs: u64,
    /// Upper bound for the pause (default: 60)
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_secs: u64,
    /// Attempts before giving up (default: 10)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            retry_delay_secs: default_retry_delay(),
            retry_jitter_secs: default_retry_jitter(),
            retry_max_delay_secs: default_retry_max_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    5
}

fn default_retry_jitter() -> u64 {
    1
}

fn default_retry_max_delay() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    10
}

/// Metrics output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Write metrics in text format to this file after a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfile: Option<PathBuf>,
}
