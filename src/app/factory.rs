use crate::{
    app::{remote::AppRemote, BookmarkApi, Pipeline},
    config::Config,
    search::SearchFeed,
    store::Store,
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Everything a front end needs, wired together.
pub struct App {
    pub config: Config,
    pub pipeline: Pipeline,
}

impl App {
    pub fn store(&self) -> &Arc<Store> {
        self.pipeline.store()
    }

    /// Live search over this app's store.
    pub fn search_feed(&self) -> SearchFeed {
        SearchFeed::spawn(self.store(), self.config.search.clone())
    }
}

/// Composition root. Must be used from within a tokio runtime.
pub struct AppFactory;

impl AppFactory {
    pub fn create_app() -> Result<App> {
        let base_path = Self::get_base_path()?;
        let config = Self::create_config(&base_path)?;
        let api = Self::create_backend(&config)?;
        Ok(Self::assemble(config, api))
    }

    /// Wire a store and pipeline around any transport.
    pub fn assemble(config: Config, api: Arc<dyn BookmarkApi>) -> App {
        let store = Arc::new(Store::new());
        let pipeline = Pipeline::new(api, store, &config.concurrency);
        App { config, pipeline }
    }

    pub fn create_config(base_path: &Path) -> Result<Config> {
        let mut config = Config::load_with(base_path)
            .with_context(|| format!("failed to load config from {}", base_path.display()))?;

        if let Ok(addr) = std::env::var("BB_ADDR") {
            config.remote_addr = addr;
        }
        config.validate()?;

        Ok(config)
    }

    fn get_base_path() -> Result<PathBuf> {
        if let Ok(base_path) = std::env::var("BB_BASE_PATH") {
            return Ok(PathBuf::from(base_path));
        }

        let home = my_home()
            .context("could not determine home directory")?
            .context("home directory path is empty")?;
        Ok(home.join(".local/share/bb-client"))
    }

    fn create_backend(config: &Config) -> Result<Arc<dyn BookmarkApi>> {
        log::info!(
            "Using remote backend: {}{}",
            config.remote_addr,
            config.resource_path
        );
        let remote = AppRemote::new(
            &config.remote_addr,
            &config.resource_path,
            Self::parse_basic_auth(),
            Self::parse_bearer_token(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Arc::new(remote))
    }

    /// Parse basic authentication from environment
    fn parse_basic_auth() -> Option<(String, Option<String>)> {
        let ba = std::env::var("BB_BASIC_AUTH").ok()?;
        parse_basic_auth(&ba)
    }

    /// Parse bearer token from environment
    fn parse_bearer_token() -> Option<String> {
        std::env::var("BB_AUTH_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn parse_basic_auth(value: &str) -> Option<(String, Option<String>)> {
    match value.split_once(':') {
        None if !value.is_empty() => Some((value.to_string(), None)),
        Some((username, password)) if !username.is_empty() => {
            Some((username.to_string(), Some(password.to_string())))
        }
        _ => {
            log::warn!("Invalid BB_BASIC_AUTH format. Expected 'username' or 'username:password'");
            None
        }
    }
}
