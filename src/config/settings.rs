//! Application settings.
//!
//! Defaults are overridden by an optional settings file (with the `config` feature)
//! and then by command-line flags.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, XrBindError};
#[cfg(feature = "config")]
use std::path::Path;

/// Delay applied after every loop tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_CONFIG_PATH: &str = "actions.json";
pub const DEFAULT_APPLICATION_NAME: &str = "xrbind";
/// Runtime buffer size for the application name, terminator included
pub const MAX_APPLICATION_NAME_SIZE: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tick_interval: Duration,
    pub config_path: PathBuf,
    pub application_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

/// Partial settings as written in a settings file; absent keys keep their current value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SettingsOverrides {
    pub tick_interval_ms: Option<u64>,
    pub config_path: Option<PathBuf>,
    pub application_name: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(ms) = overrides.tick_interval_ms {
            self.tick_interval = Duration::from_millis(ms);
        }
        if let Some(path) = overrides.config_path {
            self.config_path = path;
        }
        if let Some(name) = overrides.application_name {
            self.application_name = name;
        }
    }

    /// Reject values the runtime cannot accept
    pub fn validate(&self) -> Result<()> {
        if self.application_name.trim().is_empty() {
            return Err(XrBindError::invalid_argument(
                "application name must not be empty",
            ));
        }
        if self.application_name.len() >= MAX_APPLICATION_NAME_SIZE {
            return Err(XrBindError::invalid_argument(format!(
                "application name must be shorter than {MAX_APPLICATION_NAME_SIZE} bytes"
            )));
        }
        Ok(())
    }

    /// Location of the user settings file, e.g. `~/.config/xrbind/settings.toml`
    #[cfg(feature = "config")]
    pub fn user_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xrbind").join("settings.toml"))
    }

    /// Defaults overlaid with the user settings file, if one exists
    #[cfg(feature = "config")]
    pub fn load_user() -> Result<Self> {
        let mut settings = Self::default();
        if let Some(path) = Self::user_settings_path().filter(|p| p.is_file()) {
            settings.apply(Self::read_overrides(&path)?);
        }
        Ok(settings)
    }

    #[cfg(feature = "config")]
    pub fn read_overrides(path: &Path) -> Result<SettingsOverrides> {
        let text = std::fs::read_to_string(path).map_err(|source| XrBindError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| XrBindError::config_parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_application_name_is_rejected() {
        let settings = Settings {
            application_name: "  ".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(XrBindError::InvalidArgument { .. })
        ));
        assert!(Settings::default().validate().is_ok());

        let settings = Settings {
            application_name: "x".repeat(MAX_APPLICATION_NAME_SIZE),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn defaults_match_observed_behaviour() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval, Duration::from_millis(500));
        assert_eq!(settings.config_path, PathBuf::from("actions.json"));
    }

    #[test]
    fn overrides_only_touch_present_keys() {
        let mut settings = Settings::default();
        settings.apply(SettingsOverrides {
            tick_interval_ms: Some(16),
            ..Default::default()
        });
        assert_eq!(settings.tick_interval, Duration::from_millis(16));
        assert_eq!(settings.application_name, "xrbind");
    }

    #[cfg(feature = "config")]
    #[test]
    fn reads_toml_overrides() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "tick_interval_ms = 250\napplication_name = \"bench\"").unwrap();
        file.flush().unwrap();

        let overrides = Settings::read_overrides(file.path()).unwrap();
        assert_eq!(overrides.tick_interval_ms, Some(250));
        assert_eq!(overrides.application_name.as_deref(), Some("bench"));
        assert_eq!(overrides.config_path, None);
    }
}
