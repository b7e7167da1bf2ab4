//! CLI configuration loader for scene-browser
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./scene-browser.json or ./.scene-browser/settings.json
//! 3. Git repository root: <repo_root>/.scene-browser/settings.json
//! 4. XDG config: $XDG_CONFIG_HOME/scene-browser/settings.json or ~/.config/scene-browser/settings.json
//! 5. The platform config directory, created on first save
//!
//! Backend settings come from the same file's `backends` section, layered
//! with `SCENE_BROWSER__BACKENDS__...` environment variables.

use anyhow::{anyhow, Context, Result};
use scene_browser_core::config::{BackendSettings, BrowserSettings, JsonSettingsStore, SettingsStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for backend overrides
const ENV_PREFIX: &str = "SCENE_BROWSER";

/// Configuration resolved for one CLI session
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Settings document the session reads and writes
    pub settings_path: PathBuf,
    pub settings: BrowserSettings,
    pub backends: BackendSettings,
}

impl LoadedConfig {
    /// Store writing back to the loaded settings document
    pub fn store(&self) -> JsonSettingsStore {
        JsonSettingsStore::new(&self.settings_path)
    }
}

/// Expand `~` and environment variables in a user supplied path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    data_root_override: Option<PathBuf>,
    user_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            data_root_override: None,
            user_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set local data root override
    pub fn with_data_root_override(mut self, path: PathBuf) -> Self {
        self.data_root_override = Some(path);
        self
    }

    /// Set cloud user override
    pub fn with_user_override(mut self, user_id: String) -> Self {
        self.user_override = Some(user_id);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<LoadedConfig> {
        // Step 1: Find the settings document
        let settings_path = if let Some(override_path) = &self.config_override {
            self.resolve_override(override_path).with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_settings_path()?
        };
        debug!("Using settings file: {}", settings_path.display());

        // Step 2: Load search settings and backend settings
        let settings = JsonSettingsStore::new(&settings_path)
            .load()
            .await
            .with_context(|| format!("Failed to load settings: {}", settings_path.display()))?;
        let mut backends = self.load_backends(&settings_path)?;

        // Step 3: Apply flag overrides
        if let Some(data_root) = &self.data_root_override {
            backends.local.data_root = Some(data_root.display().to_string());
        }
        if let Some(user_id) = &self.user_override {
            backends.cloud.user_id = Some(user_id.clone());
        }

        // The working directory stands in for a data root nobody configured
        let data_root = match &backends.local.data_root {
            Some(root) => expand_path(root)?,
            None => std::env::current_dir()?,
        };
        backends.local.data_root = Some(data_root.display().to_string());

        Ok(LoadedConfig {
            settings_path,
            settings,
            backends,
        })
    }

    /// Resolve an explicit `--config` path to a settings file
    fn resolve_override(&self, path: &Path) -> Result<PathBuf> {
        if path.is_dir() {
            Ok(path.join("settings.json"))
        } else if path.is_file() || Self::parent_exists(path) {
            // A missing file in an existing directory is created on first save
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    fn parent_exists(path: &Path) -> bool {
        path.parent()
            .map_or(false, |p| p.as_os_str().is_empty() || p.is_dir())
    }

    /// Search for a settings file in priority order
    fn search_settings_path(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;

        // 1. Current working directory
        for candidate in [
            cwd.join("scene-browser.json"),
            cwd.join(".scene-browser").join("settings.json"),
        ] {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // 2. Git repository root
        if let Some(git_root) = self.find_git_root(&cwd) {
            let candidate = git_root.join(".scene-browser").join("settings.json");
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // 3. XDG config directory
        if let Some(config_dir) = self.get_xdg_config_dir() {
            let candidate = config_dir.join("scene-browser").join("settings.json");
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // 4. Platform default, created on first save
        Ok(JsonSettingsStore::default_path())
    }

    /// Read the `backends` section, layered with environment overrides
    fn load_backends(&self, settings_path: &Path) -> Result<BackendSettings> {
        let mut builder = config::Config::builder();
        if settings_path.exists() {
            builder = builder.add_source(
                config::File::from(settings_path)
                    .format(config::FileFormat::Json)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let layered = builder
            .build()
            .with_context(|| format!("Failed to read backend settings: {}", settings_path.display()))?;

        match layered.get::<BackendSettings>("backends") {
            Ok(backends) => Ok(backends),
            Err(config::ConfigError::NotFound(_)) => Ok(BackendSettings::default()),
            Err(e) => Err(e).context("Invalid backend settings"),
        }
    }

    /// Find git repository root
    fn find_git_root(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(Path::to_path_buf)
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg_config))
        } else {
            dirs::home_dir().map(|home| home.join(".config"))
        }
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_settings_and_backends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "settings": {"search_paths": ["maps/"], "keyword_search": false},
                "backends": {"local": {"data_root": "/srv/foundry"}, "cloud": {"user_id": "abc"}}
            }"#,
        )
        .unwrap();

        let loaded = CliConfigLoader::new()
            .with_config_override(path.clone())
            .load()
            .await
            .unwrap();

        assert_eq!(loaded.settings_path, path);
        assert_eq!(loaded.settings.search_paths, vec!["maps/"]);
        assert!(!loaded.settings.keyword_search);
        assert_eq!(loaded.backends.local.data_root.as_deref(), Some("/srv/foundry"));
        assert_eq!(loaded.backends.cloud.user_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_flag_overrides() {
        let temp_dir = TempDir::new().unwrap();

        let loaded = CliConfigLoader::new()
            .with_config_override(temp_dir.path().to_path_buf())
            .with_data_root_override(temp_dir.path().join("data"))
            .with_user_override("xyz".to_string())
            .load()
            .await
            .unwrap();

        assert_eq!(loaded.settings_path, temp_dir.path().join("settings.json"));
        assert_eq!(loaded.settings, BrowserSettings::default());
        assert_eq!(
            loaded.backends.local.data_root,
            Some(temp_dir.path().join("data").display().to_string())
        );
        assert_eq!(loaded.backends.cloud.user_id.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_override_directory() {
        let loader = CliConfigLoader::new();
        assert!(loader
            .resolve_override(Path::new("/definitely/not/here/settings.json"))
            .is_err());
    }

    #[test]
    fn test_expand_path() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/maps").unwrap(), home.join("maps"));
        assert_eq!(expand_path("/srv/maps").unwrap(), PathBuf::from("/srv/maps"));
    }
}
