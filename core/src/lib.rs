//! # Scene Browser Core
//!
//! Core library for scene-browser - asset discovery for tabletop scene
//! backgrounds.
//!
//! This library searches local data directories, S3 buckets and a cloud
//! asset host for image and video files whose names match a query, and
//! keeps a cache of everything it has discovered.

// Core modules
pub mod backend;
pub mod config;
pub mod error;
pub mod search;
pub mod select;

// Re-export commonly used types
pub use backend::{AssetBrowser, Listing, StorageBackends};
pub use config::{BackendSettings, BrowserSettings, Permissions, SettingsStore};
pub use error::{ConfigError, Error, ListingError, Result};
pub use search::{AssetRecord, AssetSearchEngine, KeywordSearchResults, RebuildOutcome};
pub use select::{AssetSelection, AssetSelector, SelectionAction, SelectionView};

/// Initialize tracing on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `debug` selects the debug level
/// and everything else logs at info.
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}
