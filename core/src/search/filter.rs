//! Filter evaluation and name matching

use super::normalize::{decode, file_name, file_name_with_ext, normalize};
use crate::config::{BrowserSettings, FilterRules};
use crate::error::ConfigError;
use regex::Regex;

/// Compiled include/exclude/regex rules.
///
/// A regex takes precedence: when present, include and exclude are ignored.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub regex: Option<Regex>,
}

impl FilterSpec {
    /// Compile filter rules. Returns `None` when no rule is set.
    ///
    /// A regex that fails to compile here slipped past settings validation
    /// and is reported as a misconfiguration.
    pub fn from_rules(rules: &FilterRules) -> Result<Option<Self>, ConfigError> {
        if rules.is_empty() {
            return Ok(None);
        }

        let regex = if rules.regex.is_empty() {
            None
        } else {
            Some(
                Regex::new(&rules.regex).map_err(|e| ConfigError::InvalidRegex {
                    pattern: rules.regex.clone(),
                    message: e.to_string(),
                })?,
            )
        };

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Ok(Some(Self {
            include: non_empty(&rules.include),
            exclude: non_empty(&rules.exclude),
            regex,
        }))
    }

    /// Test the filter against `path`.
    ///
    /// With `search_on_path` the decoded full path is tested, otherwise the
    /// decoded file name with extension.
    pub fn matches(&self, path: &str, search_on_path: bool) -> bool {
        let text = if search_on_path {
            decode(path).into_owned()
        } else {
            file_name_with_ext(path)
        };

        if let Some(regex) = &self.regex {
            return regex.is_match(&text);
        }
        if let Some(include) = &self.include {
            if !text.contains(include.as_str()) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if text.contains(exclude.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Apply an optional filter; an absent filter always matches
pub fn matches(path: &str, spec: Option<&FilterSpec>, search_on_path: bool) -> bool {
    spec.map_or(true, |spec| spec.matches(path, search_on_path))
}

/// Normalized query plus the general filter, as used by one search
#[derive(Debug, Clone)]
pub struct NameMatcher {
    query: String,
    filter: Option<FilterSpec>,
    search_on_path: bool,
}

impl NameMatcher {
    pub fn new(query: &str, filter: Option<FilterSpec>, search_on_path: bool) -> Self {
        Self {
            query: normalize(query),
            filter,
            search_on_path,
        }
    }

    /// Build a matcher from the general filter category of `settings`
    pub fn from_settings(query: &str, settings: &BrowserSettings) -> Result<Self, ConfigError> {
        let filter = FilterSpec::from_rules(&settings.filter_settings().general)?;
        Ok(Self::new(query, filter, settings.run_search_on_path))
    }

    /// The normalized query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Normalized text of `path` that the query is matched against
    pub fn normalized_name(&self, path: &str) -> String {
        if self.search_on_path {
            normalize(&decode(path))
        } else {
            normalize(&file_name(path))
        }
    }

    /// Whether `path` contains the query and passes the filter
    pub fn accepts(&self, path: &str) -> bool {
        self.normalized_name(path).contains(&self.query)
            && matches(path, self.filter.as_ref(), self.search_on_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(include: &str, exclude: &str, regex: &str) -> FilterSpec {
        FilterSpec::from_rules(&FilterRules {
            include: include.to_string(),
            exclude: exclude.to_string(),
            regex: regex.to_string(),
        })
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_exclude() {
        let filter = spec("", "npc", "");
        assert!(!filter.matches("assets/npc_room.png", false));
        assert!(filter.matches("assets/tavern.png", false));
    }

    #[test]
    fn test_include() {
        let filter = spec("night", "", "");
        assert!(filter.matches("maps/tavern_night.png", false));
        assert!(!filter.matches("maps/tavern_day.png", false));
        // Directory names only count when searching on the full path
        assert!(!filter.matches("night/tavern.png", false));
        assert!(filter.matches("night/tavern.png", true));
    }

    #[test]
    fn test_regex_takes_precedence() {
        let with_rules = spec("zzz", "tavern", r"^tavern_\w+\.png$");
        let regex_only = spec("", "", r"^tavern_\w+\.png$");

        for path in ["maps/tavern_night.png", "maps/forest.png", "maps/zzz.png"] {
            assert_eq!(
                with_rules.matches(path, false),
                regex_only.matches(path, false),
                "path {}",
                path
            );
        }
        assert!(with_rules.matches("maps/tavern_night.png", false));
    }

    #[test]
    fn test_regex_on_decoded_path() {
        let filter = spec("", "", "Old Town/");
        assert!(filter.matches("maps/Old%20Town/gate.png", true));
        assert!(!filter.matches("maps/Old%20Town/gate.png", false));
    }

    #[test]
    fn test_absent_filter_always_matches() {
        assert!(matches("anything.png", None, false));
        assert!(FilterSpec::from_rules(&FilterRules::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_regex_is_fatal() {
        let err = FilterSpec::from_rules(&FilterRules {
            regex: "(".to_string(),
            ..FilterRules::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn test_name_matcher() {
        let matcher = NameMatcher::new("Tavern", None, false);
        assert!(matcher.accepts("assets/maps/Tavern_Night.webp"));
        assert!(!matcher.accepts("assets/maps/Forest.png"));
        // The extension is not part of the matched name
        assert!(!NameMatcher::new("webp", None, false).accepts("maps/Tavern.webp"));

        let on_path = NameMatcher::new("maps/tav", None, true);
        assert!(on_path.accepts("assets/maps/Tavern_Night.webp"));
    }

    #[test]
    fn test_name_matcher_applies_filter() {
        let matcher = NameMatcher::new("room", Some(spec("", "npc", "")), false);
        assert!(!matcher.accepts("assets/npc_room.png"));
        assert!(matcher.accepts("assets/throne_room.png"));
    }
}
