//! CLI command implementations

pub mod cache;
pub mod paths;
pub mod scan;
pub mod search;
pub mod select;
pub mod settings;

pub use cache::cache_command;
pub use paths::{paths_command, PathsAction};
pub use scan::scan_command;
pub use search::search_command;
pub use select::select_command;
pub use settings::{settings_command, SettingsAction};

use crate::config::LoadedConfig;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use scene_browser_core::config::Permissions;
use scene_browser_core::search::RebuildOutcome;
use scene_browser_core::{AssetSearchEngine, StorageBackends};
use std::sync::Arc;
use std::time::Duration;

/// Engine and configuration shared by every command
pub struct Session {
    pub config: LoadedConfig,
    pub engine: Arc<AssetSearchEngine>,
}

impl Session {
    /// Build backends and the search engine from loaded configuration
    pub async fn open(config: LoadedConfig, permissions: Permissions) -> Result<Self> {
        let backends = StorageBackends::from_settings(&config.backends)
            .await
            .context("Failed to configure storage backends")?;

        let engine = AssetSearchEngine::builder(Arc::new(backends))
            .with_settings(config.settings.clone())
            .with_store(Arc::new(config.store()))
            .with_permissions(permissions)
            .with_asset_host(config.backends.cloud.asset_host.clone())
            .build();

        Ok(Self {
            config,
            engine: Arc::new(engine),
        })
    }

    /// Build the asset cache behind a spinner
    pub async fn warm_cache(&self) -> Option<RebuildOutcome> {
        let spinner = spinner("Scanning search paths...");
        let outcome = self.engine.initialize().await;
        spinner.finish_and_clear();
        outcome
    }
}

/// Spinner drawn on stderr so stdout stays pipeable
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
