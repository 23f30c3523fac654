//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! API keys are loaded from the YT_API_KEYS env var (comma-separated) or
//! a keys_file (one key per line), never stored in the TOML directly to
//! avoid leaking secrets. An empty key set is rejected at load time,
//! before any request is made.

use chrono::{DateTime, Utc};
use common::ApiKey;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Data API access settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(skip)]
    pub keys: Vec<ApiKey>,
    /// Path to a file with one API key per line (alternative to the
    /// YT_API_KEYS env var)
    #[serde(default)]
    pub keys_file: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Override the API endpoint (tests point this at a local server)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Collection run settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub channel_ids: Vec<String>,
    /// Only collect videos published after this instant; defaults to one
    /// year before the run
    pub published_after: Option<DateTime<Utc>>,
    pub out_dir: PathBuf,
    pub max_videos_per_channel: Option<usize>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            channel_ids: Vec::new(),
            published_after: None,
            out_dir: PathBuf::from("out"),
            max_videos_per_channel: None,
        }
    }
}

/// Container relaunch settings (the `-z/--remote` flag)
#[derive(Debug, Default, Deserialize)]
pub struct ContainerConfig {
    pub image: Option<String>,
}

/// Prometheus exposition; disabled unless an address is configured
#[derive(Debug, Default, Deserialize)]
pub struct MetricsConfig {
    pub listen_addr: Option<SocketAddr>,
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then resolve the API keys.
    ///
    /// Key resolution order:
    /// 1. YT_API_KEYS env var (comma-separated)
    /// 2. keys_file path from config (one key per line, blanks ignored)
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(ref base_url) = config.api.base_url
            && !base_url.starts_with("http://")
            && !base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }

        config.api.keys = Self::resolve_keys(&config.api.keys_file)?;
        if config.api.keys.is_empty() {
            return Err(common::Error::Config(
                "no API keys configured: set YT_API_KEYS or keys_file".into(),
            ));
        }

        Ok(config)
    }

    fn resolve_keys(keys_file: &Option<PathBuf>) -> common::Result<Vec<ApiKey>> {
        if let Ok(raw) = std::env::var("YT_API_KEYS") {
            return Ok(raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ApiKey::new)
                .collect());
        }

        if let Some(path) = keys_file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                common::Error::Config(format!("failed to read keys_file {}: {e}", path.display()))
            })?;
            return Ok(contents
                .lines()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ApiKey::new)
                .collect());
        }

        Ok(Vec::new())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_path {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("yt-collector.toml")
    }
}
