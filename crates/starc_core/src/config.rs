//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAVE_DEBOUNCE_MS, DEFAULT_SEARCH_LIMIT,
    SESSION_FILE_NAME,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which score set a completed save should display.
///
/// The save endpoint returns both the scores of the submitted text
/// (`initial_scores`) and of the server-side rewrite (`final_scores`); the
/// dedicated scores endpoint may also be refetched instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveScoreSource {
    #[default]
    Final,
    Initial,
    Refetch,
}

impl FromStr for SaveScoreSource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "final" => Ok(Self::Final),
            "initial" => Ok(Self::Initial),
            "refetch" => Ok(Self::Refetch),
            other => Err(format!(
                "unknown save score source '{}' (expected final, initial, or refetch)",
                other
            )),
        }
    }
}

/// Runtime configuration for Starc clients.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_path: PathBuf,
    pub save_debounce: Duration,
    pub request_timeout: Duration,
    pub save_score_source: SaveScoreSource,
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_path: default_session_path(),
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            save_score_source: SaveScoreSource::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_session_path() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("starc").join(SESSION_FILE_NAME)
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    parse_setting(name, &raw)
}

/// Parse the value of setting `name`, logging values that do not parse.
fn parse_setting<T: FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring invalid {}={:?}; using default", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to defaults and are logged.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let save_score_source = match env::var("STARC_SAVE_SCORES") {
            Ok(raw) => raw.parse().unwrap_or_else(|err: String| {
                tracing::warn!("{}; using final scores", err);
                SaveScoreSource::Final
            }),
            Err(_) => defaults.save_score_source,
        };
        Self {
            api_url: env::var("STARC_API_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_url),
            session_path: env::var("STARC_SESSION_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(expand_tilde)
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            save_debounce: env_parsed("STARC_SAVE_DEBOUNCE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.save_debounce),
            request_timeout: env_parsed("STARC_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            save_score_source,
            search_limit: match env_parsed::<usize>("STARC_SEARCH_LIMIT") {
                Some(0) => {
                    tracing::warn!("ignoring STARC_SEARCH_LIMIT=0; using default");
                    defaults.search_limit
                }
                Some(limit) => limit,
                None => defaults.search_limit,
            },
        }
    }
}
