//! Search orchestration and cache management

use super::asset::{AssetRecord, AssetSink, ChannelSink};
use super::cache::{AssetCache, CacheStats};
use super::filter::NameMatcher;
use super::keywords::{derive_search_terms, KeywordSearchResults};
use super::normalize::parse_keywords;
use super::paths::{PathClassifier, PathSourceParser, ResolvedPathSet};
use super::walker::TreeWalker;
use crate::backend::AssetBrowser;
use crate::config::{
    BrowserSettings, MemorySettingsStore, Permissions, SettingsStore, DEFAULT_CLOUD_ASSET_HOST,
};
use crate::error::{ConfigError, Result};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What a call to [`AssetSearchEngine::rebuild_cache`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Caching is disabled; the cache was cleared and left empty
    Disabled,

    /// The cache now holds `assets` entries
    Rebuilt { assets: usize },

    /// A rebuild was already running and will run once more when it ends
    Coalesced,
}

#[derive(Debug, Default)]
struct RebuildState {
    running: bool,
    pending: bool,
}

fn lock_state(state: &Mutex<RebuildState>) -> MutexGuard<'_, RebuildState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the rebuild slot if a rebuild is dropped before finishing
struct RebuildGuard<'a> {
    state: &'a Mutex<RebuildState>,
    active: bool,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            let mut state = lock_state(self.state);
            state.running = false;
            state.pending = false;
        }
    }
}

/// Builder for [`AssetSearchEngine`]
pub struct EngineBuilder {
    browser: Arc<dyn AssetBrowser>,
    store: Option<Arc<dyn SettingsStore>>,
    settings: Option<BrowserSettings>,
    permissions: Permissions,
    asset_host: String,
}

impl EngineBuilder {
    /// Initial settings; defaults are used otherwise
    pub fn with_settings(mut self, settings: BrowserSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Where settings changes are persisted; in memory otherwise
    pub fn with_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Host name used to recognise cloud search paths
    pub fn with_asset_host<S: Into<String>>(mut self, asset_host: S) -> Self {
        self.asset_host = asset_host.into();
        self
    }

    pub fn build(self) -> AssetSearchEngine {
        let settings = self.settings.unwrap_or_default();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySettingsStore::new(settings.clone())));

        AssetSearchEngine {
            browser: self.browser,
            store,
            permissions: self.permissions,
            classifier: PathClassifier::new(&self.asset_host),
            settings: RwLock::new(settings),
            cache: RwLock::new(AssetCache::new()),
            rebuild: Mutex::new(RebuildState::default()),
        }
    }
}

/// Finds assets across all configured search paths.
///
/// Owns the settings, the backends and the asset cache. Share it behind an
/// `Arc`; every operation takes `&self`.
pub struct AssetSearchEngine {
    browser: Arc<dyn AssetBrowser>,
    store: Arc<dyn SettingsStore>,
    permissions: Permissions,
    classifier: PathClassifier,
    settings: RwLock<BrowserSettings>,
    cache: RwLock<AssetCache>,
    rebuild: Mutex<RebuildState>,
}

impl AssetSearchEngine {
    pub fn builder(browser: Arc<dyn AssetBrowser>) -> EngineBuilder {
        EngineBuilder {
            browser,
            store: None,
            settings: None,
            permissions: Permissions::default(),
            asset_host: DEFAULT_CLOUD_ASSET_HOST.to_string(),
        }
    }

    /// Build the cache if the session may browse files
    pub async fn initialize(&self) -> Option<RebuildOutcome> {
        if !self.permissions.browse_files {
            debug!("Session cannot browse files, cache not built");
            return None;
        }
        Some(self.rebuild_cache().await)
    }

    /// Current settings
    pub async fn settings(&self) -> BrowserSettings {
        self.settings.read().await.clone()
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Replace the settings, persist them and rebuild the cache if needed.
    ///
    /// Malformed regex filters are cleared before saving. Changing the search
    /// paths forgets the remembered cloud paths. Returns the rebuild outcome
    /// when the change invalidated the cache.
    pub async fn update_settings(
        &self,
        mut settings: BrowserSettings,
    ) -> Result<Option<RebuildOutcome>> {
        if !self.permissions.modify_settings {
            return Err(ConfigError::ReadOnly.into());
        }

        settings.filters = settings.filters.as_ref().map(|f| f.sanitized());
        settings.validate()?;

        let previous = {
            let mut current = self.settings.write().await;
            if settings.search_paths != current.search_paths {
                debug!("Search paths changed, clearing remembered cloud paths");
                settings.cloud_paths.clear();
            }
            std::mem::replace(&mut *current, settings.clone())
        };

        self.store.save(&settings).await?;

        if settings.invalidates_cache(&previous) {
            Ok(Some(self.rebuild_cache().await))
        } else {
            Ok(None)
        }
    }

    /// Classify the configured search paths and resolve cloud paths
    pub async fn resolve_search_paths(&self) -> ResolvedPathSet {
        let settings = self.settings().await;
        self.resolve_paths(&settings).await
    }

    async fn resolve_paths(&self, settings: &BrowserSettings) -> ResolvedPathSet {
        let parser = PathSourceParser::new(
            self.browser.as_ref(),
            &self.classifier,
            settings.max_walk_depth,
        );
        let resolved = parser
            .parse_paths(&settings.search_paths, &settings.cloud_paths)
            .await;

        if resolved.cloud != settings.cloud_paths {
            self.remember_cloud_paths(&resolved.cloud).await;
        }
        resolved
    }

    /// Merge newly resolved cloud paths into the persisted memo
    async fn remember_cloud_paths(&self, cloud_paths: &[String]) {
        if !self.permissions.modify_settings {
            debug!("Cannot modify settings, cloud paths kept in memory only");
            return;
        }

        let snapshot = {
            let mut settings = self.settings.write().await;
            for path in cloud_paths {
                if !settings.cloud_paths.contains(path) {
                    settings.cloud_paths.push(path.clone());
                }
            }
            settings.clone()
        };

        if let Err(e) = self.store.save(&snapshot).await {
            warn!(error = %e, "Failed to persist resolved cloud paths");
        }
    }

    /// Walk every resolved root into `sink`
    async fn walk_all(
        &self,
        settings: &BrowserSettings,
        matcher: Option<&NameMatcher>,
        sink: &mut dyn AssetSink,
    ) {
        let resolved = self.resolve_paths(settings).await;

        let mut walker = TreeWalker::new(self.browser.as_ref(), settings.max_walk_depth);
        if let Some(matcher) = matcher {
            walker = walker.with_matcher(matcher);
        }

        for root in resolved.roots() {
            if sink.is_closed() {
                break;
            }
            walker.walk(&root, sink).await;
        }
    }

    async fn find_into(&self, query: &str, use_cache: bool, sink: &mut dyn AssetSink) -> Result<()> {
        let settings = self.settings().await;
        let matcher = NameMatcher::from_settings(query, &settings)?;

        if use_cache {
            let cache = self.cache.read().await;
            if !cache.is_empty() {
                debug!(query, "Searching cached assets");
                for asset in cache.search(&matcher) {
                    sink.emit(asset);
                }
                return Ok(());
            }
        }

        debug!(query, "Searching all roots");
        // A walk without a query takes every file, filters skipped
        let matcher = (!matcher.query().is_empty()).then_some(&matcher);
        self.walk_all(&settings, matcher, sink).await;
        Ok(())
    }

    /// Assets whose name contains `query` and pass the general filter.
    ///
    /// With `use_cache` and a populated cache no backend is touched;
    /// otherwise every root is walked.
    pub async fn find_assets(&self, query: &str, use_cache: bool) -> Result<BTreeSet<AssetRecord>> {
        let mut found = BTreeSet::new();
        self.find_into(query, use_cache, &mut found).await?;
        Ok(found)
    }

    /// Like [`find_assets`](Self::find_assets), sending each distinct asset
    /// to `sender` as soon as it is found. Returns how many were sent.
    pub async fn stream_assets(
        &self,
        query: &str,
        use_cache: bool,
        sender: UnboundedSender<AssetRecord>,
    ) -> Result<usize> {
        let mut sink = ChannelSink::new(sender);
        self.find_into(query, use_cache, &mut sink).await?;
        Ok(sink.len())
    }

    /// Search the full query and, when enabled, each of its keywords.
    ///
    /// An asset is listed only under the first term that found it.
    pub async fn search_with_keywords(
        &self,
        query: &str,
        ignore_keywords: bool,
    ) -> Result<KeywordSearchResults> {
        let settings = self.settings().await;
        let excluded = parse_keywords(&settings.excluded_keywords);
        let terms = derive_search_terms(query, settings.keyword_search && !ignore_keywords, &excluded);
        debug!(query, terms = ?terms, "Starting keyword search");

        let mut seen = HashSet::new();
        let mut results = KeywordSearchResults::new();
        for term in terms {
            let found = self.find_assets(&term, true).await?;
            let fresh: Vec<AssetRecord> = found
                .into_iter()
                .filter(|asset| seen.insert(asset.clone()))
                .collect();
            results.push(term, fresh);
        }

        debug!(query, total = results.total(), "Finished keyword search");
        Ok(results)
    }

    /// Replace the cache with a full walk of every root.
    ///
    /// Only one rebuild runs at a time. A request made while one is running
    /// returns [`RebuildOutcome::Coalesced`] and causes exactly one more
    /// rebuild after the current one.
    pub async fn rebuild_cache(&self) -> RebuildOutcome {
        {
            let mut state = lock_state(&self.rebuild);
            if state.running {
                state.pending = true;
                debug!("Cache rebuild already running, coalescing");
                return RebuildOutcome::Coalesced;
            }
            state.running = true;
        }

        let mut guard = RebuildGuard {
            state: &self.rebuild,
            active: true,
        };

        loop {
            let outcome = self.rebuild_once().await;

            let again = {
                let mut state = lock_state(&self.rebuild);
                if state.pending {
                    state.pending = false;
                    true
                } else {
                    state.running = false;
                    false
                }
            };

            if !again {
                guard.active = false;
                return outcome;
            }
        }
    }

    async fn rebuild_once(&self) -> RebuildOutcome {
        debug!("Starting cache rebuild");
        self.cache.write().await.clear();

        let settings = self.settings().await;
        if settings.disable_caching {
            debug!("Caching disabled, cache left empty");
            return RebuildOutcome::Disabled;
        }

        let mut found = BTreeSet::new();
        self.walk_all(&settings, None, &mut found).await;

        let assets = found.len();
        self.cache.write().await.install(found);
        info!(assets, "Asset cache rebuilt");
        RebuildOutcome::Rebuilt { assets }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
