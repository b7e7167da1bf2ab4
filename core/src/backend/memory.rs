//! In-memory backend for tests and dry runs

use super::{AssetBrowser, Listing, ROOT_TARGET};
use crate::error::ListingError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// A fake storage tree covering all three backend kinds.
///
/// Local files are data-relative paths, bucket files are object keys and
/// cloud files are full URLs. Wildcard listings are flat: they return the
/// files directly below the pattern's directory and no dirs.
#[derive(Debug, Default)]
pub struct MemoryBrowser {
    local: RwLock<BTreeSet<String>>,
    buckets: RwLock<BTreeMap<String, BTreeSet<String>>>,
    cloud: RwLock<BTreeSet<String>>,
    failures: RwLock<BTreeMap<String, ListingError>>,
    cloud_user: Option<String>,
    listings: AtomicUsize,
}

/// Split `files` into the files and subdirectories directly below `dir`
fn children(files: &BTreeSet<String>, dir: &str) -> (Vec<String>, Vec<String>) {
    let mut direct = Vec::new();
    let mut subdirs = BTreeSet::new();

    for file in files {
        let rest = if dir.is_empty() {
            file.as_str()
        } else {
            match file
                .strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => continue,
            }
        };

        match rest.split_once('/') {
            Some((first, _)) if dir.is_empty() => {
                subdirs.insert(first.to_string());
            }
            Some((first, _)) => {
                subdirs.insert(format!("{}/{}", dir, first));
            }
            None => direct.push(file.clone()),
        }
    }

    (direct, subdirs.into_iter().collect())
}

fn lock_poisoned<T>(err: std::sync::PoisonError<T>) -> T {
    err.into_inner()
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a local file (data-relative path)
    pub fn with_local_file(self, path: &str) -> Self {
        self.add_local_file(path);
        self
    }

    /// Add an object to a bucket
    pub fn with_bucket_file(self, bucket: &str, key: &str) -> Self {
        self.buckets
            .write()
            .unwrap_or_else(lock_poisoned)
            .entry(bucket.to_string())
            .or_default()
            .insert(key.trim_matches('/').to_string());
        self
    }

    /// Add a cloud file by full URL
    pub fn with_cloud_file(self, url: &str) -> Self {
        self.cloud
            .write()
            .unwrap_or_else(lock_poisoned)
            .insert(url.to_string());
        self
    }

    /// Set the authenticated cloud user
    pub fn with_cloud_user(mut self, user_id: &str) -> Self {
        self.cloud_user = Some(user_id.to_string());
        self
    }

    /// Make listings of `path` fail with `error`
    pub fn with_failure(self, path: &str, error: ListingError) -> Self {
        self.failures
            .write()
            .unwrap_or_else(lock_poisoned)
            .insert(Self::dir_key(path), error);
        self
    }

    /// Add a local file after construction
    pub fn add_local_file(&self, path: &str) {
        self.local
            .write()
            .unwrap_or_else(lock_poisoned)
            .insert(path.trim_matches('/').to_string());
    }

    /// Number of listing calls served so far
    pub fn listing_count(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    fn dir_key(path: &str) -> String {
        path.trim_matches('/').to_string()
    }

    fn begin(&self, key: &str) -> Result<(), ListingError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        match self.failures.read().unwrap_or_else(lock_poisoned).get(key) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AssetBrowser for MemoryBrowser {
    async fn browse_local(&self, path: &str) -> Result<Listing, ListingError> {
        let dir = Self::dir_key(path.trim_start_matches("./"));
        self.begin(&dir)?;

        let local = self.local.read().unwrap_or_else(lock_poisoned);
        let (files, dirs) = children(&local, &dir);
        if !dir.is_empty() && files.is_empty() && dirs.is_empty() {
            return Err(ListingError::NotFound {
                path: path.to_string(),
            });
        }

        Ok(Listing {
            target: if dir.is_empty() {
                ROOT_TARGET.to_string()
            } else {
                dir
            },
            files,
            dirs,
        })
    }

    async fn browse_bucket(&self, bucket: &str, path: &str) -> Result<Listing, ListingError> {
        let dir = Self::dir_key(path);
        self.begin(&format!("s3:{}:{}", bucket, dir))?;

        let buckets = self.buckets.read().unwrap_or_else(lock_poisoned);
        let keys = buckets.get(bucket).ok_or_else(|| ListingError::NotFound {
            path: format!("s3://{}/{}", bucket, path),
        })?;

        let (files, dirs) = children(keys, &dir);
        Ok(Listing {
            target: dir,
            files,
            dirs,
        })
    }

    async fn browse_wildcard(&self, pattern: &str) -> Result<Listing, ListingError> {
        let dir = Self::dir_key(pattern.trim_end_matches('*'));
        self.begin(&dir)?;

        let cloud = self.cloud.read().unwrap_or_else(lock_poisoned);
        let (files, _) = children(&cloud, &dir);
        Ok(Listing {
            target: dir,
            files,
            dirs: Vec::new(),
        })
    }

    async fn browse_cloud_drive(
        &self,
        drive_root: &str,
        dir: &str,
    ) -> Result<Listing, ListingError> {
        let root = Self::dir_key(drive_root);
        let relative = Self::dir_key(dir);
        let full = if relative.is_empty() {
            root.clone()
        } else {
            format!("{}/{}", root, relative)
        };
        self.begin(&full)?;

        let cloud = self.cloud.read().unwrap_or_else(lock_poisoned);
        let (files, dirs) = children(&cloud, &full);
        if files.is_empty() && dirs.is_empty() {
            return Err(ListingError::NotFound { path: full });
        }

        let prefix = format!("{}/", root);
        Ok(Listing {
            target: relative,
            files,
            dirs: dirs
                .into_iter()
                .map(|d| d.strip_prefix(&prefix).unwrap_or(&d).to_string())
                .collect(),
        })
    }

    async fn current_cloud_user(&self) -> Option<String> {
        self.cloud_user.clone()
    }
}
