//! Persisted panel preferences.
//!
//! The only durable client-side state is the theme preference. It lives in a
//! small TOML file, the native stand-in for the browser's local storage.

use crate::bridge::{FetchOptions, NuiBridge};
use crate::events::{SetTheme, ThemePayload};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Theme the panel renders with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
    /// Follow the host/OS setting
    System,
}

impl FromStr for ThemePreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(ThemePreference::Dark),
            "light" => Ok(ThemePreference::Light),
            "system" | "auto" => Ok(ThemePreference::System),
            _ => Err(anyhow!(
                "Unknown theme '{s}'. Available: dark, light, system"
            )),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemePreference::Dark => write!(f, "dark"),
            ThemePreference::Light => write!(f, "light"),
            ThemePreference::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    theme: ThemePreference,
}

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, the default when nothing was saved yet.
    pub fn load_theme(&self) -> Result<ThemePreference> {
        Ok(self.read()?.theme)
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<()> {
        let mut file = self.read()?;
        file.theme = theme;
        self.write(&file)?;
        log::info!("[nui][prefs] theme set to {theme}");
        Ok(())
    }

    fn read(&self) -> Result<PreferenceFile> {
        if !self.path.exists() {
            return Ok(PreferenceFile::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))
    }

    fn write(&self, file: &PreferenceFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(file).context("Failed to encode preferences")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

/// Tell the host about a theme change. Best effort: the stored preference
/// stays authoritative, so a failure is only logged. Returns whether the
/// host acknowledged the change.
pub async fn sync_theme(bridge: &NuiBridge, theme: ThemePreference) -> bool {
    match bridge
        .call::<SetTheme>(&ThemePayload { theme }, FetchOptions::new())
        .await
    {
        Ok(_) => true,
        Err(e) => {
            log::debug!("[nui][prefs] host not told about theme {theme}: {e}");
            false
        }
    }
}
