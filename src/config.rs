//! User configuration.
//!
//! Defaults can be overridden by a JSON file, looked up in order at
//! `~/.chirps/config.json` and `./.chirps.json`. The first one that parses
//! wins.
//! Keys that are missing take their default; unknown keys are ignored.
//!
//! ```json
//! { "download_dir": "~/data/chirps", "retry_times": 5, "keep_compressed": false }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, warn};
use serde::Deserialize;

use crate::{
    archive::DEFAULT_BASE_URL,
    download::FetchOptions,
    error::{ChirpsError, Result},
    retry::{RetryPolicy, MAX_DELAY},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub download_dir: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry_times: u32,
    pub retry_delay_secs: f64,
    pub retry_backoff: f64,
    pub keep_compressed: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            download_dir: "~/data/chirps".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            retry_times: 3,
            retry_delay_secs: 1.0,
            retry_backoff: 2.0,
            keep_compressed: true,
            log_level: "info".to_string(),
        }
    }
}

/// Outcome of looking for a config file. Kept separate from logging so the
/// logger can be set up from the loaded level first.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    /// File the config came from, if any.
    pub path: Option<PathBuf>,
    /// Files that exist but could not be used.
    pub skipped: Vec<(PathBuf, ChirpsError)>,
}

impl Loaded {
    pub fn log(&self) {
        for (path, e) in &self.skipped {
            warn!("Failed to load config from {}: {}", path.display(), e);
        }
        if let Some(path) = &self.path {
            info!("Loaded configuration from {}", path.display());
        }
    }
}

impl Config {
    pub fn load() -> Loaded {
        Self::load_from(&Self::search_paths())
    }

    /// Uses the first of `paths` that exists and parses, or the defaults.
    pub fn load_from(paths: &[PathBuf]) -> Loaded {
        let mut skipped = vec![];

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => {
                    return Loaded {
                        config,
                        path: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push((path.clone(), e)),
            }
        }

        Loaded {
            config: Config::default(),
            path: None,
            skipped,
        }
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".chirps").join("config.json"));
        }
        paths.push(PathBuf::from(".chirps.json"));

        paths
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(text).map_err(|e| ChirpsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if Duration::try_from_secs_f64(self.retry_delay_secs).is_err() {
            return Err(ChirpsError::Config(format!(
                "retry_delay_secs must be a non-negative number of seconds, got {}",
                self.retry_delay_secs
            )));
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff < 0.0 {
            return Err(ChirpsError::Config(format!(
                "retry_backoff must be a non-negative number, got {}",
                self.retry_backoff
            )));
        }
        Ok(())
    }

    /// `download_dir` with a leading `~` expanded.
    pub fn download_dir(&self) -> PathBuf {
        expand_home(&self.download_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_times,
            Duration::try_from_secs_f64(self.retry_delay_secs.max(0.0))
                .map_or(MAX_DELAY, |d| d.min(MAX_DELAY)),
            self.retry_backoff,
        )
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            keep_compressed: self.keep_compressed,
            retry: self.retry_policy(),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

// -- Tests -------------------------------------------------------------------
