//! Configuration for the asset browser
//!
//! Pure data types plus the settings store. Locating configuration files is
//! left to the CLI layer.

pub mod backends;
pub mod permissions;
pub mod settings;
pub mod store;

pub use backends::{
    BackendSettings, CloudBackendSettings, LocalBackendSettings, S3BackendSettings,
    DEFAULT_CLOUD_ASSET_HOST,
};
pub use permissions::Permissions;
pub use settings::{
    BrowserSettings, FilterCategory, FilterRules, SearchFilterSettings, DEFAULT_SEARCH_PATH,
};
pub use store::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
