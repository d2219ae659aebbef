//! Persisted generation defaults.
//!
//! Settings hold parameter defaults applied under every request, an
//! optional output directory and an optional default template. They are
//! stored as TOML or JSON, picked by file extension, in the platform
//! config directory unless a path is given.

use boxjoint_templates::{ParamMap, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

const APP_DIR: &str = "boxjoint";
const FILE_NAME: &str = "settings.toml";

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Platform settings path, e.g. `~/.config/boxjoint/settings.toml`.
pub fn default_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| SettingsError::ConfigDirectory("no platform config directory".to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory generated documents are written to when no output path
    /// is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Template id used when none is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_template: Option<String>,
    /// Parameter defaults, overridden by every request.
    pub defaults: ParamMap,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = SettingsFormat::from_path(path).ok_or_else(|| {
            SettingsError::LoadError(format!(
                "{} must be a .toml or .json file",
                path.display()
            ))
        })?;
        let content = fs::read_to_string(path)?;
        let settings: Self = match format {
            SettingsFormat::Toml => toml::from_str(&content)?,
            SettingsFormat::Json => serde_json::from_str(&content)?,
        };
        settings.validate()?;
        debug!(
            "Loaded settings from {} ({} defaults)",
            path.display(),
            settings.defaults.len()
        );
        Ok(settings)
    }

    /// Like [`Settings::load_from_file`], but a missing file yields the
    /// defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a `.toml` or `.json` file, creating its directory.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = SettingsFormat::from_path(path).ok_or_else(|| {
            SettingsError::SaveError(format!(
                "{} must be a .toml or .json file",
                path.display()
            ))
        })?;
        let content = match format {
            SettingsFormat::Toml => toml::to_string_pretty(self)?,
            SettingsFormat::Json => serde_json::to_string_pretty(self)?,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e))
            })?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if let Some(id) = &self.default_template {
            id.parse::<Template>()
                .map_err(|e| SettingsError::invalid("default_template", e.to_string()))?;
        }
        if let Some(dir) = &self.output_dir {
            if dir.as_os_str().is_empty() {
                return Err(SettingsError::invalid("output_dir", "must not be empty"));
            }
        }
        // TOML has no null.
        if let Some((key, _)) = self.defaults.iter().find(|(_, v)| v.is_null()) {
            return Err(SettingsError::invalid(key.clone(), "must not be null"));
        }
        Ok(())
    }

    /// The defaults with `overrides` applied on top.
    pub fn merged(&self, overrides: &ParamMap) -> ParamMap {
        let mut params = self.defaults.clone();
        for (key, value) in overrides {
            params.insert(key.clone(), value.clone());
        }
        params
    }

    pub fn set_default(&mut self, key: impl Into<String>, value: Value) {
        self.defaults.insert(key.into(), value);
    }

    /// The requested template, falling back to the configured default.
    pub fn template(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::to_string)
            .or_else(|| self.default_template.clone())
    }
}
