//! URL normalization and result matching.
//!
//! Two URLs are considered the same page when their host and path agree,
//! ignoring scheme, port, query, fragment and a single trailing slash.
//! Strings that do not parse as absolute URLs are compared verbatim.

use url::Url;

use crate::models::SearchResult;

/// Canonical form of `raw` used for equality comparison.
///
/// Returns `host + path` with one trailing `/` removed, or `raw` itself
/// when it cannot be parsed.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("");
            let path = parsed.path();
            let path = path.strip_suffix('/').unwrap_or(path);
            format!("{}{}", host, path)
        }
        Err(_) => raw.to_string(),
    }
}

/// Position of the first result pointing at `target_url`.
///
/// Results are assumed to be in rank order, so the first match is the
/// highest-ranked one.
pub fn find_url_position(results: &[SearchResult], target_url: &str) -> Option<u32> {
    let target = normalize_url(target_url);
    results
        .iter()
        .find(|r| normalize_url(&r.url) == target)
        .map(|r| r.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: u32, url: &str) -> SearchResult {
        SearchResult {
            position,
            url: url.to_string(),
            title: format!("title {}", position),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(normalize_url("https://a.com/x"), normalize_url("https://a.com/x/"));
        assert_eq!(normalize_url("https://a.com/x"), "a.com/x");
    }

    #[test]
    fn test_only_one_trailing_slash_removed() {
        assert_eq!(normalize_url("https://a.com/x//"), "a.com/x/");
    }

    #[test]
    fn test_root_path_collapses_to_host() {
        assert_eq!(normalize_url("https://a.com/"), "a.com");
        assert_eq!(normalize_url("https://a.com"), "a.com");
    }

    #[test]
    fn test_scheme_query_fragment_port_ignored() {
        let expected = "a.com/docs/page";
        assert_eq!(normalize_url("http://a.com/docs/page"), expected);
        assert_eq!(normalize_url("https://a.com/docs/page?utm_source=x"), expected);
        assert_eq!(normalize_url("https://a.com/docs/page#intro"), expected);
        assert_eq!(normalize_url("https://a.com:8443/docs/page/"), expected);
    }

    #[test]
    fn test_host_is_lowercased_path_is_not() {
        assert_eq!(normalize_url("https://A.COM/Docs"), "a.com/Docs");
    }

    #[test]
    fn test_subdomain_is_significant() {
        assert_ne!(normalize_url("https://www.a.com/x"), normalize_url("https://a.com/x"));
    }

    #[test]
    fn test_malformed_returned_unchanged() {
        for raw in ["not a url", "a.com/page/", "", "/relative/path/", "://missing"] {
            assert_eq!(normalize_url(raw), raw);
        }
    }

    #[test]
    fn test_find_empty_results() {
        assert_eq!(find_url_position(&[], "https://a.com/p"), None);
    }

    #[test]
    fn test_find_no_match() {
        let results = vec![result(1, "https://b.com/p"), result(2, "https://c.com/p")];
        assert_eq!(find_url_position(&results, "https://a.com/p"), None);
    }

    #[test]
    fn test_find_returns_result_position() {
        let results = vec![
            result(1, "https://b.com/"),
            result(2, "https://c.com/p"),
            result(3, "http://a.com/p/?ref=1"),
        ];
        assert_eq!(find_url_position(&results, "https://a.com/p"), Some(3));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let results = vec![result(1, "https://a.com/p"), result(2, "https://a.com/p/")];
        assert_eq!(find_url_position(&results, "https://a.com/p"), Some(1));
    }

    #[test]
    fn test_malformed_target_matches_literally() {
        let results = vec![result(1, "https://b.com/"), result(2, "a.com/page")];
        assert_eq!(find_url_position(&results, "a.com/page"), Some(2));
        assert_eq!(find_url_position(&results, "a.com/page/"), None);
    }
}
