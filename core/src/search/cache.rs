//! In-memory cache of every discovered asset

use super::asset::AssetRecord;
use super::filter::NameMatcher;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Lifecycle of the asset cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Nothing has been built yet
    Uninitialized,

    /// Caching is disabled, or the cache was invalidated
    Empty,

    /// Holds the result of the last full walk
    Populated,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Uninitialized => "uninitialized",
            CacheState::Empty => "empty",
            CacheState::Populated => "populated",
        }
    }
}

/// Set of all assets found by the last full walk
#[derive(Debug)]
pub struct AssetCache {
    assets: BTreeSet<AssetRecord>,
    state: CacheState,
    rebuilds: u64,
    last_update: Option<Instant>,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    pub fn new() -> Self {
        Self {
            assets: BTreeSet::new(),
            state: CacheState::Uninitialized,
            rebuilds: 0,
            last_update: None,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Drop every cached asset
    pub fn clear(&mut self) {
        self.assets.clear();
        self.state = CacheState::Empty;
        self.last_update = None;
    }

    /// Replace the whole set with the result of a fresh walk
    pub fn install(&mut self, assets: BTreeSet<AssetRecord>) {
        self.assets = assets;
        self.state = CacheState::Populated;
        self.rebuilds += 1;
        self.last_update = Some(Instant::now());
    }

    /// Cached assets accepted by `matcher`
    pub fn search(&self, matcher: &NameMatcher) -> BTreeSet<AssetRecord> {
        self.assets
            .iter()
            .filter(|asset| matcher.accepts(asset.path()))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let (images, videos) = self.assets.iter().fold((0, 0), |(i, v), asset| {
            if asset.is_image() {
                (i + 1, v)
            } else if asset.is_video() {
                (i, v + 1)
            } else {
                (i, v)
            }
        });

        CacheStats {
            assets: self.assets.len(),
            images,
            videos,
            rebuilds: self.rebuilds,
            state: self.state,
            age: self.last_update.map(|t| t.elapsed()),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub assets: usize,
    pub images: usize,
    pub videos: usize,

    /// Number of rebuilds that populated the cache
    pub rebuilds: u64,
    pub state: CacheState,

    #[serde(skip)]
    pub age: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(paths: &[&str]) -> BTreeSet<AssetRecord> {
        paths.iter().map(|p| AssetRecord::new(*p)).collect()
    }

    #[test]
    fn test_lifecycle() {
        let mut cache = AssetCache::new();
        assert_eq!(cache.state(), CacheState::Uninitialized);

        cache.clear();
        assert_eq!(cache.state(), CacheState::Empty);

        cache.install(assets(&["maps/a.png", "maps/b.webm", "maps/c.txt"]));
        assert_eq!(cache.state(), CacheState::Populated);

        let stats = cache.stats();
        assert_eq!(stats.assets, 3);
        assert_eq!(stats.images, 1);
        assert_eq!(stats.videos, 1);
        assert_eq!(stats.rebuilds, 1);
        assert!(stats.age.is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().rebuilds, 1);
    }

    #[test]
    fn test_search() {
        let mut cache = AssetCache::new();
        cache.install(assets(&[
            "assets/maps/Tavern_Night.webp",
            "assets/maps/Forest.png",
        ]));

        let found = cache.search(&NameMatcher::new("tavern", None, false));
        assert_eq!(found, assets(&["assets/maps/Tavern_Night.webp"]));
    }
}
