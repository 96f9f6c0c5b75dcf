// Search matching: subsequence gate plus fuzzy score ranking

use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::model::ColorOption;

/// Check whether `query` is a subsequence of `candidate`: every
/// character of the query appears in the candidate in order, not
/// necessarily contiguously. The empty query matches everything.
/// Both sides are compared lowercased.
pub fn is_subsequence(candidate: &str, query: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let mut chars = candidate.chars();
    query
        .to_lowercase()
        .chars()
        .all(|q| chars.any(|c| c == q))
}

/// Normalize a search query for matching: lowercase, `#` stripped so
/// typed hex values line up with stored `#RRGGBB` strings either way.
pub fn normalize_query(query: &str) -> String {
    query.trim().replace('#', "").to_lowercase()
}

/// A color option matches when the query is a subsequence of its
/// title, hex, hex2 or any keyword. Each field is checked on its own;
/// one hit is enough.
pub fn matches(option: &ColorOption, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    is_subsequence(&option.title, query)
        || is_subsequence(option.hex.trim_start_matches('#'), query)
        || option
            .hex2
            .as_deref()
            .is_some_and(|hex2| is_subsequence(hex2.trim_start_matches('#'), query))
        || option.keywords.iter().any(|kw| is_subsequence(kw, query))
}

/// Rank a matched option for ordering within its section. Scores come
/// from nucleo against the title; the subsequence gate above decides
/// membership, so a zero score never drops an entry.
pub fn rank(option: &ColorOption, query: &str, matcher: &mut Matcher) -> i64 {
    if query.is_empty() {
        return 0;
    }

    let mut query_buf = Vec::new();
    let needle = Utf32Str::new(query, &mut query_buf);

    let mut title_buf = Vec::new();
    let title = Utf32Str::new(&option.title, &mut title_buf);
    let title_score = matcher.fuzzy_match(title, needle).unwrap_or(0) as i64;

    let mut best = title_score;
    for keyword in &option.keywords {
        let mut kw_buf = Vec::new();
        let haystack = Utf32Str::new(keyword, &mut kw_buf);
        let score = matcher.fuzzy_match(haystack, needle).unwrap_or(0) as i64;
        if score > best {
            best = score;
        }
    }
    best
}

/// Fresh matcher with default config
pub fn new_matcher() -> Matcher {
    Matcher::new(Config::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorOption;

    fn option(title: &str, hex: &str, keywords: &[&str]) -> ColorOption {
        ColorOption {
            title: title.to_string(),
            hex: hex.to_string(),
            hex2: None,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            id: None,
            favorite: false,
            created_at: 0,
            last_used: 0,
        }
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert!(is_subsequence("anything", ""));
        assert!(is_subsequence("", ""));
        assert!(matches(&option("Mint Green", "#66D4CF", &[]), ""));
    }

    #[test]
    fn test_subsequence_semantics() {
        assert!(is_subsequence("mint green", "mg"));
        assert!(is_subsequence("mint green", "mint"));
        assert!(is_subsequence("mint green", "mtgrn"));
        assert!(!is_subsequence("mint green", "gm"));
        assert!(!is_subsequence("", "a"));
        // case-insensitive both ways
        assert!(is_subsequence("Mint Green", "MINT"));
    }

    #[test]
    fn test_matches_any_field() {
        let opt = option("Mint Green", "#66D4CF", &["mint", "teal"]);
        assert!(matches(&opt, "mint"));
        assert!(matches(&opt, "teal"));
        assert!(matches(&opt, "66d4cf"));
        assert!(!matches(&opt, "zz"));

        let mut grad = option("Sunset", "#FF4757", &[]);
        grad.hex2 = Some("#1E90FF".to_string());
        assert!(matches(&grad, "1e90ff"));
    }

    #[test]
    fn test_normalize_query_strips_hash() {
        assert_eq!(normalize_query("#FF4757"), "ff4757");
        assert_eq!(normalize_query("  Mint "), "mint");
    }
}
