//! Recursive directory traversal across storage backends

use super::asset::{AssetRecord, AssetSink};
use super::filter::NameMatcher;
use super::paths::SearchRoot;
use crate::backend::{AssetBrowser, Listing};
use crate::error::ListingError;
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

/// Walks one search root and emits matching files into a sink.
///
/// Without a matcher every file found is emitted, which is how the cache
/// is populated.
pub struct TreeWalker<'a> {
    browser: &'a dyn AssetBrowser,
    matcher: Option<&'a NameMatcher>,
    max_depth: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(browser: &'a dyn AssetBrowser, max_depth: usize) -> Self {
        Self {
            browser,
            matcher: None,
            max_depth,
        }
    }

    /// Only emit files accepted by `matcher`
    pub fn with_matcher(mut self, matcher: &'a NameMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Walk `root` and everything below it
    pub async fn walk(&self, root: &SearchRoot, sink: &mut dyn AssetSink) {
        if root.is_empty() {
            return;
        }

        debug!(root = %root, "Walking search root");
        self.walk_dir(root.clone(), 0, sink).await;
    }

    async fn list(&self, root: &SearchRoot) -> Result<Listing, ListingError> {
        match root {
            SearchRoot::Local(path) => self.browser.browse_local(path).await,
            SearchRoot::Bucket { bucket, path } => self.browser.browse_bucket(bucket, path).await,
            SearchRoot::Cloud(pattern) => self.browser.browse_wildcard(pattern).await,
        }
    }

    fn walk_dir<'s>(
        &'s self,
        dir: SearchRoot,
        depth: usize,
        sink: &'s mut dyn AssetSink,
    ) -> BoxFuture<'s, ()> {
        async move {
            if sink.is_closed() {
                return;
            }
            if depth > self.max_depth {
                warn!(path = %dir, max_depth = self.max_depth, "Maximum walk depth reached");
                return;
            }

            let listing = match self.list(&dir).await {
                Ok(listing) => listing,
                Err(err) => {
                    warn!(path = %dir, error = %err, "Failed to list directory, skipping");
                    return;
                }
            };

            // A listing that resolved to the filesystem root is never walked
            if listing.is_root() {
                debug!(path = %dir, "Listing resolved to the root, not descending");
                return;
            }

            for file in listing.files {
                let accepted = self.matcher.map_or(true, |m| m.accepts(&file));
                if accepted {
                    sink.emit(AssetRecord::new(file));
                }
            }

            for sub in listing.dirs {
                if sink.is_closed() {
                    return;
                }
                self.walk_dir(dir.with_path(sub), depth + 1, &mut *sink)
                    .await;
            }
        }
        .boxed()
    }
}
