//! Application configuration assembled from `AUDYN_*` environment variables.

use std::path::PathBuf;

use audyn_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};
use audyn_torrent_engine::{DEFAULT_COMMENT, DEFAULT_CREATOR, EngineConfig};
use tracing::debug;

use crate::error::ConfigError;
use crate::validate::{parse_log_format, parse_log_level, parse_piece_length};

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "AUDYN_";
/// Application data directory used when `AUDYN_APP_DIR` is unset.
pub const DEFAULT_APP_DIR: &str = "./audyn-data";

const TORRENTS_SUBDIR: &str = "torrents";

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Application data directory.
    pub app_dir: PathBuf,
    /// Directory receiving `createTorrentInAppDir` output.
    pub torrent_dir: PathBuf,
    /// `created by` value stamped into authored torrents.
    pub creator: String,
    /// `comment` value stamped into authored torrents.
    pub comment: String,
    /// Fixed piece length for authoring; chosen per torrent when absent.
    pub piece_length: Option<u32>,
    /// Log level passed to the tracing filter.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        let app_dir = PathBuf::from(DEFAULT_APP_DIR);
        Self {
            torrent_dir: app_dir.join(TORRENTS_SUBDIR),
            app_dir,
            creator: DEFAULT_CREATOR.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            piece_length: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::infer(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// `lookup` receives fully qualified names (for example `AUDYN_APP_DIR`).
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            let name = format!("{ENV_PREFIX}{key}");
            let value = lookup(&name).filter(|value| !value.trim().is_empty());
            (name, value)
        };
        let defaults = Self::default();

        let app_dir = read("APP_DIR").1.map_or(defaults.app_dir, PathBuf::from);
        let torrent_dir = read("TORRENT_DIR")
            .1
            .map_or_else(|| app_dir.join(TORRENTS_SUBDIR), PathBuf::from);
        let creator = read("TORRENT_CREATOR").1.unwrap_or(defaults.creator);
        let comment = read("TORRENT_COMMENT").1.unwrap_or(defaults.comment);

        let piece_length = match read("PIECE_LENGTH") {
            (name, Some(value)) => Some(parse_piece_length(&name, &value)?),
            (_, None) => None,
        };
        let log_level = match read("LOG_LEVEL") {
            (name, Some(value)) => parse_log_level(&name, &value)?,
            (_, None) => defaults.log_level,
        };
        let log_format = match read("LOG_FORMAT") {
            (name, Some(value)) => parse_log_format(&name, &value)?,
            (_, None) => defaults.log_format,
        };

        let config = Self {
            app_dir,
            torrent_dir,
            creator,
            comment,
            piece_length,
            log_level,
            log_format,
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Authoring settings for the in-process engine.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            creator: self.creator.clone(),
            comment: self.comment.clone(),
            piece_length: self.piece_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() -> Result<(), ConfigError> {
        let config = load(&[])?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.torrent_dir, PathBuf::from("./audyn-data/torrents"));
        assert_eq!(config.engine_config(), EngineConfig::default());
        Ok(())
    }

    #[test]
    fn torrent_dir_follows_app_dir_unless_set() -> Result<(), ConfigError> {
        let config = load(&[("AUDYN_APP_DIR", "/var/lib/audyn")])?;
        assert_eq!(config.torrent_dir, PathBuf::from("/var/lib/audyn/torrents"));

        let config = load(&[
            ("AUDYN_APP_DIR", "/var/lib/audyn"),
            ("AUDYN_TORRENT_DIR", "/srv/torrents"),
        ])?;
        assert_eq!(config.torrent_dir, PathBuf::from("/srv/torrents"));
        Ok(())
    }

    #[test]
    fn authoring_overrides_reach_engine_config() -> Result<(), ConfigError> {
        let config = load(&[
            ("AUDYN_TORRENT_CREATOR", "studio"),
            ("AUDYN_TORRENT_COMMENT", "mastered"),
            ("AUDYN_PIECE_LENGTH", "262144"),
            ("AUDYN_LOG_FORMAT", "json"),
            ("AUDYN_LOG_LEVEL", ""),
        ])?;
        let engine = config.engine_config();
        assert_eq!(engine.creator, "studio");
        assert_eq!(engine.comment, "mastered");
        assert_eq!(engine.piece_length, Some(262_144));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("AUDYN_PIECE_LENGTH", "1000")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidVar { ref var, ref value, .. })
                if var == "AUDYN_PIECE_LENGTH" && value == "1000"
        ));
    }
}
