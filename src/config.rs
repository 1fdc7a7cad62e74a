//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/tagaffinity/config.toml` (XDG) or platform config dir
//! 2. Project config: `.tagaffinity.toml`
//! 3. Explicit file passed with `--config`
//! 4. Environment variables: `TAGAFFINITY_*`, nested with `__`
//!    (e.g. `TAGAFFINITY_CRAWL__UNIQUE_USERS=200`)
//!
//! # Example
//!
//! ```toml
//! [crawl]
//! unique_users = 50
//! hashtags_per_user = 1
//! status_limit = 80
//!
//! [throttle]
//! cooldown_secs = 900
//!
//! [layout]
//! center = -92.5
//!
//! [[candidates]]
//! name = "Trump"
//! hashtags = ["Trump2016"]
//!
//! [[candidates]]
//! name = "Cruz"
//! hashtags = ["Cruz2016", "CruzCrew"]
//! ```
//!
//! Candidates are processed in the order they are listed.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::feed::RetryPolicy;
use crate::graph::GeoLayout;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub layout: GeoLayout,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A public figure and the hashtags that identify their supporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate name, used as the candidate node label.
    pub name: String,
    /// Hashtags without the leading `#`, OR-combined into one search.
    pub hashtags: Vec<String>,
}

impl Candidate {
    pub fn new<S: AsRef<str>>(name: &str, hashtags: &[S]) -> Self {
        Self {
            name: name.to_string(),
            hashtags: hashtags.iter().map(|h| h.as_ref().to_string()).collect(),
        }
    }
}

/// Crawl bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of unique supporters collected per candidate.
    pub unique_users: usize,
    /// Stop reading a user's timeline once this many distinct hashtags are tallied.
    pub hashtags_per_user: usize,
    /// Maximum number of posts examined per user.
    pub status_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            unique_users: 50,
            hashtags_per_user: 1,
            status_limit: 80,
        }
    }
}

/// Rate-limit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Seconds to sleep after the provider reports a rate limit.
    pub cooldown_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: RetryPolicy::DEFAULT_COOLDOWN.as_secs(),
        }
    }
}

impl ThrottleConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(self.cooldown_secs))
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load config with an extra file layered above the project config.
    pub fn load_with(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".tagaffinity.toml"));

        // Layer 3: Explicit config file
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        Self::from_figment(figment.merge(Env::prefixed("TAGAFFINITY_").split("__")))
    }

    /// Extracts config from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// Checks that there is something to crawl.
    ///
    /// # Errors
    ///
    /// [`AppError::NoCandidates`] if no candidate is configured, or
    /// [`AppError::EmptyHashtags`] for a candidate without hashtags.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.candidates.is_empty() {
            return Err(AppError::NoCandidates);
        }
        if let Some(candidate) = self.candidates.iter().find(|c| c.hashtags.is_empty()) {
            return Err(AppError::EmptyHashtags(candidate.name.clone()));
        }
        Ok(())
    }

    /// User config path: ~/.config/tagaffinity/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("tagaffinity").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("tagaffinity").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        Config::from_figment(Figment::new().merge(Toml::string(toml))).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.crawl, CrawlConfig::default());
        assert_eq!(config.crawl.unique_users, 50);
        assert_eq!(
            config.throttle.retry_policy().cooldown(),
            Duration::from_secs(900)
        );
        assert_eq!(config.layout, GeoLayout::default());
        assert!(config.candidates.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            [crawl]
            unique_users = 200
            status_limit = 500

            [throttle]
            cooldown_secs = 60

            [layout]
            center = -80.0

            [[candidates]]
            name = "Trump"
            hashtags = ["Trump2016", "TrumpTrain"]

            [[candidates]]
            name = "Kasich"
            hashtags = ["Kasich2016"]
            "#,
        );

        assert_eq!(config.crawl.unique_users, 200);
        assert_eq!(config.crawl.hashtags_per_user, 1);
        assert_eq!(config.crawl.status_limit, 500);
        assert_eq!(config.throttle.cooldown_secs, 60);
        assert_eq!(config.layout.center, -80.0);
        assert_eq!(config.layout.user, GeoLayout::default().user);
        assert_eq!(
            config.candidates,
            vec![
                Candidate::new("Trump", &["Trump2016", "TrumpTrain"]),
                Candidate::new("Kasich", &["Kasich2016"]),
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_no_candidates() {
        assert!(matches!(parse("").validate(), Err(AppError::NoCandidates)));
    }

    #[test]
    fn test_validate_empty_hashtags() {
        let config = parse(
            r#"
            [[candidates]]
            name = "Cruz"
            hashtags = []
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(AppError::EmptyHashtags(name)) if name == "Cruz"
        ));
    }
}
