//! Asset discovery and matching
//!
//! This module finds image and video assets across the configured search
//! paths:
//! - Name normalization and include/exclude/regex filters
//! - Classification of search paths into local, bucket and cloud roots
//! - Recursive traversal with incremental emission of matches
//! - Keyword-expanded searches and a cache of every discovered asset

pub mod asset;
pub mod cache;
pub mod engine;
pub mod filter;
pub mod keywords;
pub mod normalize;
pub mod paths;
pub mod walker;


pub use asset::{AssetKind, AssetRecord, AssetSink, ChannelSink};
pub use cache::{AssetCache, CacheState, CacheStats};
pub use engine::{AssetSearchEngine, EngineBuilder, RebuildOutcome};
pub use filter::{FilterSpec, NameMatcher};
pub use keywords::{derive_search_terms, KeywordSearchResults};
pub use normalize::{file_name, file_name_with_ext, is_image, is_video, normalize, parse_keywords};
pub use paths::{PathClassifier, PathSourceParser, ResolvedPathSet, SearchPathEntry, SearchRoot};
pub use walker::TreeWalker;
