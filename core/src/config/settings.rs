//! Persisted browser settings
//!
//! These are the values the settings forms write and the search engine reads.
//! Core only accepts settings in this shape; locating and loading the file
//! that holds them is left to the caller.

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Search path used when nothing has been configured
pub const DEFAULT_SEARCH_PATH: &str = "modules/caeora-maps-tokens-assets/assets/maps/";

/// Include/exclude/regex rules for one asset category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub include: String,
    pub exclude: String,
    pub regex: String,
}

impl FilterRules {
    /// Whether any rule is set
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.regex.is_empty()
    }

    /// Check that the regex (if any) compiles
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regex.is_empty() {
            return Ok(());
        }
        Regex::new(&self.regex)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidRegex {
                pattern: self.regex.clone(),
                message: e.to_string(),
            })
    }

    /// Copy of these rules with an invalid regex replaced by "no regex"
    pub fn sanitized(&self) -> Self {
        match self.validate() {
            Ok(()) => self.clone(),
            Err(err) => {
                warn!("Discarding filter regex: {}", err);
                Self {
                    regex: String::new(),
                    ..self.clone()
                }
            }
        }
    }
}

/// Asset categories that carry their own filter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    General,
    Token,
    Portrait,
}

impl FilterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCategory::General => "general",
            FilterCategory::Token => "token",
            FilterCategory::Portrait => "portrait",
        }
    }
}

impl std::str::FromStr for FilterCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(FilterCategory::General),
            "token" => Ok(FilterCategory::Token),
            "portrait" => Ok(FilterCategory::Portrait),
            other => Err(ConfigError::InvalidValue {
                field: "filter category".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Filter rules for every category. Only `general` is applied by searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilterSettings {
    pub general: FilterRules,
    pub token: FilterRules,
    pub portrait: FilterRules,
}

impl SearchFilterSettings {
    pub fn get(&self, category: FilterCategory) -> &FilterRules {
        match category {
            FilterCategory::General => &self.general,
            FilterCategory::Token => &self.token,
            FilterCategory::Portrait => &self.portrait,
        }
    }

    pub fn get_mut(&mut self, category: FilterCategory) -> &mut FilterRules {
        match category {
            FilterCategory::General => &mut self.general,
            FilterCategory::Token => &mut self.token,
            FilterCategory::Portrait => &mut self.portrait,
        }
    }

    /// Copy with every malformed regex coerced to empty
    pub fn sanitized(&self) -> Self {
        Self {
            general: self.general.sanitized(),
            token: self.token.sanitized(),
            portrait: self.portrait.sanitized(),
        }
    }
}

/// All settings consumed by the search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Raw search path strings (local paths, `s3:bucket:path`, cloud URLs)
    pub search_paths: Vec<String>,

    /// Filter rules; `None` until the filter form is first saved
    pub filters: Option<SearchFilterSettings>,

    /// Legacy single-string token filter, seeds `filters.token.include`
    pub token_filter: String,

    /// Legacy single-string portrait filter, seeds `filters.portrait.include`
    pub portrait_filter: String,

    /// Skip the asset cache and walk every root on each search
    pub disable_caching: bool,

    /// Content filter toggle; changing it invalidates the cache
    pub filter_msrd: bool,

    /// Search the individual words of a query as well as the full query
    pub keyword_search: bool,

    /// Words never used as keyword search terms (comma or space separated)
    pub excluded_keywords: String,

    /// Match against the whole path instead of just the file name
    pub run_search_on_path: bool,

    /// Resolved cloud wildcard paths remembered across sessions
    pub cloud_paths: Vec<String>,

    /// Do not open the selection dialog automatically
    pub disable_automatic_popup: bool,

    pub debug: bool,

    /// Maximum directory depth a single walk will descend
    pub max_walk_depth: usize,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            search_paths: vec![DEFAULT_SEARCH_PATH.to_string()],
            filters: None,
            token_filter: String::new(),
            portrait_filter: String::new(),
            disable_caching: false,
            filter_msrd: false,
            keyword_search: true,
            excluded_keywords: "and,for".to_string(),
            run_search_on_path: false,
            cloud_paths: Vec::new(),
            disable_automatic_popup: false,
            debug: false,
            max_walk_depth: 64,
        }
    }
}

impl BrowserSettings {
    /// Filter settings, falling back to the legacy single-string filters
    pub fn filter_settings(&self) -> SearchFilterSettings {
        match &self.filters {
            Some(filters) => filters.clone(),
            None => SearchFilterSettings {
                token: FilterRules {
                    include: self.token_filter.clone(),
                    ..FilterRules::default()
                },
                portrait: FilterRules {
                    include: self.portrait_filter.clone(),
                    ..FilterRules::default()
                },
                ..SearchFilterSettings::default()
            },
        }
    }

    /// Store filter rules for one category, coercing a malformed regex to empty
    pub fn set_filter(&mut self, category: FilterCategory, rules: FilterRules) {
        let mut filters = self.filter_settings();
        *filters.get_mut(category) = rules.sanitized();
        self.filters = Some(filters);
    }

    /// Replace the search paths from newline separated text.
    ///
    /// Blank lines are dropped and duplicates keep their first position.
    pub fn set_search_paths_from_text(&mut self, text: &str) {
        let mut paths: Vec<String> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !paths.iter().any(|p| p == line) {
                paths.push(line.to_string());
            }
        }
        self.search_paths = paths;
    }

    /// Search paths as newline separated text
    pub fn search_paths_text(&self) -> String {
        self.search_paths.join("\n")
    }

    /// Whether a change from `previous` to `self` requires a cache rebuild
    pub fn invalidates_cache(&self, previous: &BrowserSettings) -> bool {
        self.search_paths != previous.search_paths
            || self.disable_caching != previous.disable_caching
            || self.filter_msrd != previous.filter_msrd
    }

    /// Validate values that cannot be coerced
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_walk_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_walk_depth".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
