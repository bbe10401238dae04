use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::{app::task_runner::ConcurrencyPolicy, store::OpKind};

const DEFAULT_REMOTE_ADDR: &str = "http://localhost:3000";
const DEFAULT_RESOURCE_PATH: &str = "/api/bookmarks";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Title dominates ranking; url matches still count.
const DEFAULT_TITLE_WEIGHT: f32 = 0.7;
const DEFAULT_URL_WEIGHT: f32 = 0.3;
/// Shortest run of matched characters worth reporting.
const DEFAULT_MIN_MATCH_CHAR_LENGTH: usize = 2;
/// Largest normalized edit distance a misspelled query token may have.
const DEFAULT_TYPO_THRESHOLD: f64 = 0.35;

const CONFIG_FILE: &str = "config.yaml";

/// Concurrency discipline per operation kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    #[serde(default = "ignore_while_in_flight")]
    pub load: ConcurrencyPolicy,
    #[serde(default = "ignore_while_in_flight")]
    pub create: ConcurrencyPolicy,
    #[serde(default = "queue")]
    pub update: ConcurrencyPolicy,
    #[serde(default = "queue")]
    pub delete: ConcurrencyPolicy,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            load: ConcurrencyPolicy::IgnoreWhileInFlight,
            create: ConcurrencyPolicy::IgnoreWhileInFlight,
            update: ConcurrencyPolicy::Queue,
            delete: ConcurrencyPolicy::Queue,
        }
    }
}

impl ConcurrencyConfig {
    pub fn policy(&self, kind: OpKind) -> ConcurrencyPolicy {
        match kind {
            OpKind::Load => self.load,
            OpKind::Create => self.create,
            OpKind::Update => self.update,
            OpKind::Delete => self.delete,
        }
    }
}

fn ignore_while_in_flight() -> ConcurrencyPolicy {
    ConcurrencyPolicy::IgnoreWhileInFlight
}

fn queue() -> ConcurrencyPolicy {
    ConcurrencyPolicy::Queue
}

/// Fuzzy search tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_title_weight")]
    pub title_weight: f32,

    #[serde(default = "default_url_weight")]
    pub url_weight: f32,

    #[serde(default = "default_min_match_char_length")]
    pub min_match_char_length: usize,

    #[serde(default = "default_typo_threshold")]
    pub typo_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            title_weight: DEFAULT_TITLE_WEIGHT,
            url_weight: DEFAULT_URL_WEIGHT,
            min_match_char_length: DEFAULT_MIN_MATCH_CHAR_LENGTH,
            typo_threshold: DEFAULT_TYPO_THRESHOLD,
        }
    }
}

fn default_title_weight() -> f32 {
    DEFAULT_TITLE_WEIGHT
}

fn default_url_weight() -> f32 {
    DEFAULT_URL_WEIGHT
}

fn default_min_match_char_length() -> usize {
    DEFAULT_MIN_MATCH_CHAR_LENGTH
}

fn default_typo_threshold() -> f64 {
    DEFAULT_TYPO_THRESHOLD
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_remote_addr")]
    pub remote_addr: String,

    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_addr: DEFAULT_REMOTE_ADDR.to_string(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            concurrency: ConcurrencyConfig::default(),
            search: SearchConfig::default(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_remote_addr() -> String {
    DEFAULT_REMOTE_ADDR.to_string()
}

fn default_resource_path() -> String {
    DEFAULT_RESOURCE_PATH.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.remote_addr.trim().is_empty() {
            bail!("remote_addr cannot be empty");
        }

        if !self.resource_path.starts_with('/') {
            bail!(
                "resource_path must start with '/', got {:?}",
                self.resource_path
            );
        }

        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        let search = &self.search;
        if search.title_weight < 0.0 || search.url_weight < 0.0 {
            bail!("search weights cannot be negative");
        }
        if search.title_weight + search.url_weight == 0.0 {
            bail!("at least one search weight must be positive");
        }
        if search.min_match_char_length == 0 {
            bail!("search.min_match_char_length must be greater than 0");
        }
        if !(0.0..=1.0).contains(&search.typo_threshold) {
            bail!(
                "search.typo_threshold must be between 0 and 1, got {}",
                search.typo_threshold
            );
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing defaults if it does not exist.
    pub fn load_with(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let base_path = base_path.as_ref();
        let path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            log::info!("Creating default config at {}", path.display());
            std::fs::create_dir_all(base_path)?;
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("config {} is malformed", path.display()))?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)?;
        Ok(())
    }
}
