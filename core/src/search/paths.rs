//! Search path classification and cloud path resolution

use crate::backend::AssetBrowser;
use crate::config::DEFAULT_CLOUD_ASSET_HOST;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// One configured search path, classified by backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPathEntry {
    /// A path in the local data directory
    Local(String),

    /// `s3:<bucket>:<path>`
    S3 { bucket: String, path: String },

    /// `<root_url><user_id>/<path>` on the cloud asset host
    Cloud {
        root_url: String,
        user_id: String,
        path: String,
    },
}

/// Classifies raw search path strings.
///
/// Every string lands in exactly one class. An `s3:` string without a
/// bucket is kept as a local path, so listing it fails and gets reported
/// like any other unreachable root.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    /// `<asset host>/`, the part of a cloud URL right before the user id
    host_prefix: String,
}

impl PathClassifier {
    pub fn new(asset_host: &str) -> Self {
        Self {
            host_prefix: format!("{}/", asset_host.trim_end_matches('/')),
        }
    }

    pub fn classify(&self, raw: &str) -> SearchPathEntry {
        if let Some(rest) = raw.strip_prefix("s3:") {
            return match rest.rsplit_once(':') {
                Some((bucket, path)) if !bucket.is_empty() => SearchPathEntry::S3 {
                    bucket: bucket.to_string(),
                    path: path.to_string(),
                },
                _ => SearchPathEntry::Local(raw.to_string()),
            };
        }

        self.classify_cloud(raw)
            .unwrap_or_else(|| SearchPathEntry::Local(raw.to_string()))
    }

    /// `<anything><host>/<user id>/<path>`, taking the last host occurrence
    /// that is followed by a user id
    fn classify_cloud(&self, raw: &str) -> Option<SearchPathEntry> {
        raw.rmatch_indices(&self.host_prefix).find_map(|(start, _)| {
            let split = start + self.host_prefix.len();
            let (user_id, path) = raw[split..].split_once('/')?;
            let is_user_id =
                !user_id.is_empty() && user_id.chars().all(|c| c.is_alphanumeric() || c == '_');
            is_user_id.then(|| SearchPathEntry::Cloud {
                root_url: raw[..split].to_string(),
                user_id: user_id.to_string(),
                path: path.to_string(),
            })
        })
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CLOUD_ASSET_HOST)
    }
}

/// A root the tree walker can start from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    Local(String),
    Bucket { bucket: String, path: String },
    Cloud(String),
}

impl SearchRoot {
    /// Whether there is nothing to search
    pub fn is_empty(&self) -> bool {
        match self {
            SearchRoot::Local(path) | SearchRoot::Cloud(path) => path.is_empty(),
            SearchRoot::Bucket { bucket, path } => bucket.is_empty() && path.is_empty(),
        }
    }

    /// The same backend and bucket, at another path
    pub fn with_path(&self, path: String) -> Self {
        match self {
            SearchRoot::Local(_) => SearchRoot::Local(path),
            SearchRoot::Bucket { bucket, .. } => SearchRoot::Bucket {
                bucket: bucket.clone(),
                path,
            },
            SearchRoot::Cloud(_) => SearchRoot::Cloud(path),
        }
    }
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchRoot::Local(path) => write!(f, "{}", path),
            SearchRoot::Bucket { bucket, path } => write!(f, "s3:{}:{}", bucket, path),
            SearchRoot::Cloud(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// Search paths grouped by backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPathSet {
    /// Local paths in configuration order
    pub local: Vec<String>,

    /// Bucket name to the sub-paths configured for it
    pub buckets: BTreeMap<String, Vec<String>>,

    /// Resolved cloud wildcard paths, including remembered ones
    pub cloud: Vec<String>,
}

impl ResolvedPathSet {
    /// Every root to walk: local paths, bucket paths, then cloud paths
    pub fn roots(&self) -> Vec<SearchRoot> {
        let local = self.local.iter().cloned().map(SearchRoot::Local);
        let buckets = self.buckets.iter().flat_map(|(bucket, paths)| {
            paths.iter().map(move |path| SearchRoot::Bucket {
                bucket: bucket.clone(),
                path: path.clone(),
            })
        });
        let cloud = self.cloud.iter().cloned().map(SearchRoot::Cloud);
        local.chain(buckets).chain(cloud).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.buckets.is_empty() && self.cloud.is_empty()
    }
}

/// Append `path` unless it is already present
fn push_unique(paths: &mut Vec<String>, path: String) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Resolves raw search paths into a [`ResolvedPathSet`]
pub struct PathSourceParser<'a> {
    browser: &'a dyn AssetBrowser,
    classifier: &'a PathClassifier,
    max_depth: usize,
}

impl<'a> PathSourceParser<'a> {
    pub fn new(
        browser: &'a dyn AssetBrowser,
        classifier: &'a PathClassifier,
        max_depth: usize,
    ) -> Self {
        Self {
            browser,
            classifier,
            max_depth,
        }
    }

    /// Classify every raw path, pre-walking the current cloud user's drive.
    ///
    /// `memo` holds cloud paths resolved in earlier runs; the returned cloud
    /// list is `memo` followed by any newly discovered paths.
    pub async fn parse_paths(&self, raw_paths: &[String], memo: &[String]) -> ResolvedPathSet {
        debug!(count = raw_paths.len(), "Parsing search paths");

        let mut resolved = ResolvedPathSet::default();
        let mut discovered: Vec<String> = Vec::new();
        let mut current_user: Option<Option<String>> = None;

        for raw in raw_paths {
            match self.classifier.classify(raw) {
                SearchPathEntry::Local(path) => resolved.local.push(path),
                SearchPathEntry::S3 { bucket, path } => {
                    resolved.buckets.entry(bucket).or_default().push(path);
                }
                SearchPathEntry::Cloud {
                    root_url,
                    user_id,
                    path,
                } => {
                    if current_user.is_none() {
                        current_user = Some(self.browser.current_cloud_user().await);
                    }

                    if current_user.as_ref().and_then(|u| u.as_deref()) == Some(user_id.as_str()) {
                        let drive_root = format!("{}{}/", root_url, user_id);
                        self.walk_cloud_drive(&drive_root, path, 0, &mut discovered)
                            .await;
                    } else {
                        // Another user's drive cannot be enumerated
                        push_unique(&mut discovered, format!("{}/*", raw.trim_end_matches('/')));
                    }
                }
            }
        }

        let mut cloud = memo.to_vec();
        for path in discovered {
            push_unique(&mut cloud, path);
        }
        resolved.cloud = cloud;

        debug!(
            local = resolved.local.len(),
            buckets = resolved.buckets.len(),
            cloud = resolved.cloud.len(),
            "Parsed search paths"
        );
        resolved
    }

    /// Record a wildcard path for `dir` and every directory below it.
    ///
    /// A directory that cannot be listed contributes nothing.
    fn walk_cloud_drive<'s>(
        &'s self,
        drive_root: &'s str,
        dir: String,
        depth: usize,
        out: &'s mut Vec<String>,
    ) -> BoxFuture<'s, ()> {
        async move {
            if depth > self.max_depth {
                info!(drive_root, dir = %dir, "Cloud drive walk reached maximum depth");
                return;
            }

            let listing = match self.browser.browse_cloud_drive(drive_root, &dir).await {
                Ok(listing) => listing,
                Err(err) => {
                    debug!(drive_root, dir = %dir, error = %err, "Cloud directory not listable");
                    return;
                }
            };

            let pattern = if dir.is_empty() || dir.ends_with('/') {
                format!("{}{}*", drive_root, dir)
            } else {
                format!("{}{}/*", drive_root, dir)
            };
            push_unique(out, pattern);

            if listing.is_root() {
                return;
            }

            for sub in listing.dirs {
                self.walk_cloud_drive(drive_root, sub, depth + 1, &mut *out)
                    .await;
            }
        }
        .boxed()
    }
}
