//! Storage backends that can list asset directories
//!
//! Every backend answers the same question: what files and subdirectories
//! live directly under a path. The search engine only talks to the
//! [`AssetBrowser`] trait, so backends can be swapped or faked in tests.

pub mod cloud;
pub mod local;
pub mod memory;
pub mod s3;

use crate::config::BackendSettings;
use crate::error::{ListingError, Result};
use async_trait::async_trait;
use tracing::debug;

pub use cloud::CloudHostBrowser;
pub use local::LocalBrowser;
pub use memory::MemoryBrowser;
pub use s3::S3Browser;

/// Target reported by a listing of the filesystem root
pub const ROOT_TARGET: &str = ".";

/// Immediate children of a listed directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// The directory the backend actually listed
    pub target: String,

    /// File paths, usable as asset sources
    pub files: Vec<String>,

    /// Subdirectory paths, usable as the next path to list
    pub dirs: Vec<String>,
}

impl Listing {
    /// Whether the backend resolved the request to the filesystem root
    pub fn is_root(&self) -> bool {
        self.target == ROOT_TARGET
    }
}

/// Directory listing across the three storage kinds
#[async_trait]
pub trait AssetBrowser: Send + Sync {
    /// List a path in the local data directory
    async fn browse_local(&self, path: &str) -> std::result::Result<Listing, ListingError>;

    /// List a prefix inside an S3 bucket
    async fn browse_bucket(
        &self,
        bucket: &str,
        path: &str,
    ) -> std::result::Result<Listing, ListingError>;

    /// List a cloud host wildcard pattern such as `<root><user>/maps/*`
    async fn browse_wildcard(&self, pattern: &str) -> std::result::Result<Listing, ListingError>;

    /// List a directory of a cloud user's drive.
    ///
    /// `dir` is relative to `drive_root`; returned dirs are relative too.
    async fn browse_cloud_drive(
        &self,
        drive_root: &str,
        dir: &str,
    ) -> std::result::Result<Listing, ListingError>;

    /// Id of the authenticated cloud host user, if any
    async fn current_cloud_user(&self) -> Option<String>;
}

/// Routes listings to whichever backends are configured
#[derive(Default)]
pub struct StorageBackends {
    local: Option<LocalBrowser>,
    s3: Option<S3Browser>,
    cloud: Option<CloudHostBrowser>,
}

impl StorageBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every backend enabled in `settings`
    pub async fn from_settings(settings: &BackendSettings) -> Result<Self> {
        let mut backends = Self::new();

        if let Some(root) = &settings.local.data_root {
            backends = backends.with_local(LocalBrowser::new(root));
        }

        if settings.s3.enabled {
            backends = backends.with_s3(S3Browser::from_settings(&settings.s3).await);
        }

        if settings.cloud.api_url.is_some() {
            backends = backends.with_cloud(CloudHostBrowser::from_settings(&settings.cloud)?);
        }

        debug!(
            local = backends.local.is_some(),
            s3 = backends.s3.is_some(),
            cloud = backends.cloud.is_some(),
            "Configured storage backends"
        );

        Ok(backends)
    }

    pub fn with_local(mut self, local: LocalBrowser) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_s3(mut self, s3: S3Browser) -> Self {
        self.s3 = Some(s3);
        self
    }

    pub fn with_cloud(mut self, cloud: CloudHostBrowser) -> Self {
        self.cloud = Some(cloud);
        self
    }

    fn unavailable(backend: &str) -> ListingError {
        ListingError::Unavailable {
            backend: backend.to_string(),
        }
    }
}

#[async_trait]
impl AssetBrowser for StorageBackends {
    async fn browse_local(&self, path: &str) -> std::result::Result<Listing, ListingError> {
        match &self.local {
            Some(local) => local.browse(path).await,
            None => Err(Self::unavailable("local")),
        }
    }

    async fn browse_bucket(
        &self,
        bucket: &str,
        path: &str,
    ) -> std::result::Result<Listing, ListingError> {
        match &self.s3 {
            Some(s3) => s3.browse(bucket, path).await,
            None => Err(Self::unavailable("s3")),
        }
    }

    async fn browse_wildcard(&self, pattern: &str) -> std::result::Result<Listing, ListingError> {
        match &self.cloud {
            Some(cloud) => cloud.browse_wildcard(pattern).await,
            None => Err(Self::unavailable("cloud")),
        }
    }

    async fn browse_cloud_drive(
        &self,
        drive_root: &str,
        dir: &str,
    ) -> std::result::Result<Listing, ListingError> {
        match &self.cloud {
            Some(cloud) => cloud.browse_drive(drive_root, dir).await,
            None => Err(Self::unavailable("cloud")),
        }
    }

    async fn current_cloud_user(&self) -> Option<String> {
        self.cloud.as_ref().and_then(|c| c.user_id().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_backends_are_unavailable() {
        let backends = StorageBackends::new();

        assert_eq!(
            backends.browse_local("maps/").await,
            Err(ListingError::Unavailable {
                backend: "local".to_string()
            })
        );
        assert!(backends.browse_bucket("bucket", "maps").await.is_err());
        assert!(backends.browse_wildcard("https://x/abc/*").await.is_err());
        assert_eq!(backends.current_cloud_user().await, None);
    }

    #[tokio::test]
    async fn test_local_backend_is_routed() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("maps")).unwrap();
        std::fs::write(temp_dir.path().join("maps/cave.png"), b"png").unwrap();

        let backends = StorageBackends::new().with_local(LocalBrowser::new(temp_dir.path()));
        let listing = backends.browse_local("maps").await.unwrap();
        assert_eq!(listing.files, vec!["maps/cave.png"]);
    }

    #[test]
    fn test_root_listing() {
        let listing = Listing {
            target: ROOT_TARGET.to_string(),
            ..Listing::default()
        };
        assert!(listing.is_root());
        assert!(!Listing::default().is_root());
    }
}
