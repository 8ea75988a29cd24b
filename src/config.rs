//! Settings for the VCR transport and environment-driven configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::censor::Censors;
use crate::delay::DelayPolicy;
use crate::error::VcrError;
use crate::matching::MatchRules;
use crate::mode::Mode;

/// Environment variable selecting the [`Mode`].
pub const MODE_ENV: &str = "VCR_MODE";
/// Environment variable naming the cassette folder.
pub const CASSETTE_DIR_ENV: &str = "VCR_CASSETTE_DIR";
/// Cassette folder used when [`CASSETTE_DIR_ENV`] is unset.
pub const DEFAULT_CASSETTE_DIR: &str = "tests/cassettes";

/// What to do when a matching interaction is older than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationAction {
    /// Log a warning and replay it anyway.
    Warn,
    /// Fail the call with [`VcrError::InteractionExpired`].
    Fail,
    /// Make the real call again and overwrite it (auto mode only).
    RecordAgain,
}

/// Maximum age of a replayable interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration {
    /// How long an interaction stays valid after it was recorded.
    pub valid_for: Duration,
    /// Action taken on an expired interaction.
    pub action: ExpirationAction,
}

impl Expiration {
    /// Create an expiration window.
    #[must_use]
    pub fn new(valid_for: Duration, action: ExpirationAction) -> Self {
        Self { valid_for, action }
    }

    /// Returns `true` if something recorded at `recorded_at` is stale at `now`.
    #[must_use]
    pub fn is_expired(&self, recorded_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - recorded_at > self.valid_for
    }
}

/// Tuning for recording and replaying, fixed when the transport is built.
#[derive(Debug, Clone, Default)]
pub struct AdvancedSettings {
    /// Redaction applied before anything is stored or compared.
    pub censors: Censors,
    /// Rules deciding which stored interaction answers a request.
    pub match_rules: MatchRules,
    /// Latency simulated on replay.
    pub delay: DelayPolicy,
    /// Optional maximum age of replayable interactions.
    pub expiration: Option<Expiration>,
}

/// Mode and cassette folder read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcrConfig {
    /// Operating mode.
    pub mode: Mode,
    /// Folder holding cassette files.
    pub cassette_dir: PathBuf,
}

impl Default for VcrConfig {
    fn default() -> Self {
        Self { mode: Mode::Auto, cassette_dir: PathBuf::from(DEFAULT_CASSETTE_DIR) }
    }
}

impl VcrConfig {
    /// Read [`MODE_ENV`] and [`CASSETTE_DIR_ENV`], loading a `.env` file first
    /// if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::Config`] if the mode cannot be parsed.
    pub fn from_env() -> Result<Self, VcrError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the same variables from a dotenv-style file at `path`. Variables
    /// already set in the process environment take precedence, as they do
    /// for [`VcrConfig::from_env`]. The process environment is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::Config`] if the file cannot be read or parsed, or
    /// the mode is invalid.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, VcrError> {
        let path = path.as_ref();
        let invalid = |e: dotenvy::Error| VcrError::Config(format!("{}: {e}", path.display()));
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(invalid)? {
            let (key, value) = item.map_err(invalid)?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| vars.get(key).cloned()))
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::Config`] if the mode cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VcrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mode = match lookup(MODE_ENV).filter(|value| !value.trim().is_empty()) {
            Some(value) => value.parse()?,
            None => defaults.mode,
        };
        let cassette_dir = lookup(CASSETTE_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map_or(defaults.cassette_dir, PathBuf::from);
        Ok(Self { mode, cassette_dir })
    }
}
