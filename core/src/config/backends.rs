//! Storage backend configuration

use serde::{Deserialize, Serialize};

/// Cloud asset host used when none is configured
pub const DEFAULT_CLOUD_ASSET_HOST: &str = "assets.forge-vtt.com";

/// Local data directory backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBackendSettings {
    /// Directory that local search paths are resolved against
    pub data_root: Option<String>,
}

/// S3 bucket backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BackendSettings {
    pub enabled: bool,

    /// AWS region, falls back to the default provider chain when unset
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,

    /// Base URL for object links; `{bucket}` is replaced with the bucket name
    pub public_base_url: Option<String>,
}

/// Third-party cloud asset host backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudBackendSettings {
    /// Host name that identifies cloud asset URLs in search paths
    pub asset_host: String,

    /// Browse API endpoint; the backend is disabled when unset
    pub api_url: Option<String>,

    /// Bearer key for the browse API
    pub api_key: Option<String>,

    /// Id of the authenticated cloud user
    pub user_id: Option<String>,
}

impl Default for CloudBackendSettings {
    fn default() -> Self {
        Self {
            asset_host: DEFAULT_CLOUD_ASSET_HOST.to_string(),
            api_url: None,
            api_key: None,
            user_id: None,
        }
    }
}

/// Configuration for every storage backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub local: LocalBackendSettings,
    pub s3: S3BackendSettings,
    pub cloud: CloudBackendSettings,
}
