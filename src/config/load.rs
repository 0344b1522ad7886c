use std::env;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

use super::schema::Settings;

/// Prefix of the per-key overrides, e.g. `OSU_BROWSER__PLAYBACK__SCRUB_SECONDS`.
const ENV_PREFIX: &str = "OSU_BROWSER";
/// Names the config file outright, skipping the XDG lookup.
const CONFIG_PATH_VAR: &str = "OSU_BROWSER_CONFIG_PATH";

impl Settings {
    /// Settings from the resolved config file with environment overrides on top.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Layer `path` (when given and present) under the environment, then
    /// validate. A missing file is not an error; a malformed one is.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        let settings: Settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the rest of the browser cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |key: &'static str, reason: &'static str| -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { key, reason })
        };

        if self.playback.poll_interval_ms == 0 {
            return invalid("playback.poll_interval_ms", "must be at least 1");
        }
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return invalid("library.extensions", "must name at least one extension");
        }
        if self.playlists.default_name.trim().is_empty() {
            return invalid("playlists.default_name", "must not be blank");
        }
        Ok(())
    }
}

/// `$OSU_BROWSER_CONFIG_PATH` when set, else [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `osu-browser/config.toml` under `$XDG_CONFIG_HOME`, or under `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("osu-browser").join("config.toml"))
}
