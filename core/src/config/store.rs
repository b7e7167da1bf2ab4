//! Persistent settings storage

use super::settings::BrowserSettings;
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Key holding the browser settings inside a settings document
const SETTINGS_KEY: &str = "settings";

/// Key/value storage for browser settings.
///
/// Writes are last-write-wins; no store detects concurrent modification.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the stored settings, or defaults when nothing is stored yet
    async fn load(&self) -> Result<BrowserSettings>;

    /// Persist the settings
    async fn save(&self, settings: &BrowserSettings) -> Result<()>;
}

/// Settings stored in a JSON document under the `settings` key.
///
/// Other top level keys (such as `backends`) are left untouched on save.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Get the default settings file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("scene-browser");
        path.push("settings.json");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::InvalidFormat {
                message: format!("{} is not a JSON object", self.path.display()),
            }
            .into()),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<BrowserSettings> {
        let document = self.read_document().await?;
        match document.get(SETTINGS_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(BrowserSettings::default()),
        }
    }

    async fn save(&self, settings: &BrowserSettings) -> Result<()> {
        let mut document = self.read_document().await?;
        document.insert(SETTINGS_KEY.to_string(), serde_json::to_value(settings)?);

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(document))?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<BrowserSettings>>,
}

impl MemorySettingsStore {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings: RwLock::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<BrowserSettings> {
        Ok(self.settings.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, settings: &BrowserSettings) -> Result<()> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }
}
