//! Keyword expansion of search queries

use super::asset::AssetRecord;
use super::normalize::normalize;
use serde::Serialize;

/// Minimum length a query word needs to become its own search term
const MIN_KEYWORD_LEN: usize = 3;

/// Search terms for `query`: the full query first, then its keywords.
///
/// Keywords are the query's words (split on non-word characters) that are
/// at least three characters long and not in `excluded`, lowercased and
/// taken from the last word to the first. A word that normalizes to the
/// full query or to an earlier keyword is dropped.
/// `excluded` is expected in normalized form, see
/// [`parse_keywords`](super::normalize::parse_keywords).
pub fn derive_search_terms(query: &str, keyword_search: bool, excluded: &[String]) -> Vec<String> {
    let mut terms = vec![query.to_string()];
    if !keyword_search {
        return terms;
    }

    // Matching is done on normalized names, so that is what repeats are judged by
    let mut searched = vec![normalize(query)];
    let words = query
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
        .rev();

    for word in words {
        let normalized = normalize(word);
        if excluded.contains(&normalized) || searched.contains(&normalized) {
            continue;
        }
        searched.push(normalized);
        terms.push(word.to_lowercase());
    }
    terms
}

/// Results of a keyword-expanded search, in search-term order.
///
/// Every asset appears under the first term that found it and nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordSearchResults {
    groups: Vec<(String, Vec<AssetRecord>)>,
}

impl KeywordSearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, term: String, assets: Vec<AssetRecord>) {
        self.groups.push((term, assets));
    }

    /// Assets found for `term`
    pub fn get(&self, term: &str) -> Option<&[AssetRecord]> {
        self.groups
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, assets)| assets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AssetRecord])> {
        self.groups
            .iter()
            .map(|(term, assets)| (term.as_str(), assets.as_slice()))
    }

    /// Search terms in the order they were searched
    pub fn terms(&self) -> Vec<&str> {
        self.groups.iter().map(|(term, _)| term.as_str()).collect()
    }

    /// Number of assets across all terms
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, assets)| assets.len()).sum()
    }

    /// Whether no term found anything
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl IntoIterator for KeywordSearchResults {
    type Item = (String, Vec<AssetRecord>);
    type IntoIter = std::vec::IntoIter<(String, Vec<AssetRecord>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::normalize::parse_keywords;

    const QUERY: &str = "The Lost Temple and the Cave";

    #[test]
    fn test_terms_run_from_last_word() {
        let terms = derive_search_terms(QUERY, true, &parse_keywords("and,for"));
        assert_eq!(terms, vec![QUERY, "cave", "the", "temple", "lost"]);
    }

    #[test]
    fn test_excluded_keywords_are_dropped() {
        let terms = derive_search_terms(QUERY, true, &parse_keywords("and, for, the"));
        assert_eq!(terms, vec![QUERY, "cave", "temple", "lost"]);
    }

    #[test]
    fn test_keyword_search_disabled() {
        assert_eq!(
            derive_search_terms(QUERY, false, &[]),
            vec![QUERY.to_string()]
        );
    }

    #[test]
    fn test_short_words_and_duplicates() {
        let terms = derive_search_terms("cave of cave-ox", true, &[]);
        assert_eq!(terms, vec!["cave of cave-ox", "cave"]);

        // A single keyword equal to the query is not searched twice
        assert_eq!(derive_search_terms("cave", true, &[]), vec!["cave"]);
    }

    #[test]
    fn test_capitalized_query_is_searched_once() {
        assert_eq!(derive_search_terms("Tavern", true, &[]), vec!["Tavern"]);
        assert_eq!(
            derive_search_terms("Dark Forest", true, &[]),
            vec!["Dark Forest", "forest", "dark"]
        );
    }

    #[test]
    fn test_results_accessors() {
        let mut results = KeywordSearchResults::new();
        results.push("cave".to_string(), vec![AssetRecord::new("cave.png")]);
        results.push("lost".to_string(), Vec::new());

        assert_eq!(results.terms(), vec!["cave", "lost"]);
        assert_eq!(results.total(), 1);
        assert!(!results.is_empty());
        assert_eq!(results.get("lost"), Some(&[][..]));
        assert!(results.get("temple").is_none());
    }
}
