//! Wire-level description of a timeline search request.
//!
//! The legacy search timeline only answers requests that look like the
//! site's own XHR calls, so every parameter and header here is fixed to
//! what the web client sends. [`SearchRequest`] is plain data; the
//! executor turns it into an actual HTTP call.

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::{Result, ScrapeError};
use crate::query::CompiledQuery;

/// Legacy search timeline endpoint.
pub const SEARCH_TIMELINE_URL: &str = "https://twitter.com/i/search/timeline";

/// Search source tag the web client reports (`typed query`).
pub const SEARCH_SOURCE: &str = "typd";

/// Vertical the web client searches in.
const SEARCH_VERTICAL: &str = "default";

/// Browser identity the endpoint expects.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.78 Safari/537.36";

const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";

/// One fully described timeline request: endpoint, query parameters and
/// headers. Building never fails; values that cannot be carried in an
/// HTTP header surface later through [`SearchRequest::header_map`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Endpoint URL.
    pub url: &'static str,
    /// Query parameters, in the order the web client sends them.
    pub params: Vec<(&'static str, String)>,
    /// Request headers mimicking the site's own XHR calls.
    pub headers: Vec<(&'static str, String)>,
}

impl SearchRequest {
    /// Describe the request for one result page.
    ///
    /// `cursor` is the `min_position` returned by the previous page;
    /// pass `None` for the first page. The compiled query is embedded
    /// raw in both the `q` parameter and the referer header, exactly
    /// like the web client does.
    pub fn build(query: &CompiledQuery, language: &str, cursor: Option<&str>) -> Self {
        let mut params = vec![
            ("vertical", SEARCH_VERTICAL.to_string()),
            ("src", SEARCH_SOURCE.to_string()),
            ("q", query.as_str().to_string()),
            ("l", language.to_string()),
            ("include_available_features", "1".to_string()),
            ("include_entities", "1".to_string()),
            ("include_new_items_bar", "true".to_string()),
        ];
        if let Some(position) = cursor {
            params.push(("max_position", position.to_string()));
        }

        let referer = format!(
            "https://twitter.com/search?q={}&src={}",
            query.as_str(),
            SEARCH_SOURCE
        );
        let headers = vec![
            ("accept", ACCEPT.to_string()),
            ("accept-language", ACCEPT_LANGUAGE.to_string()),
            ("referer", referer),
            ("user-agent", USER_AGENT.to_string()),
            ("x-requested-with", "XMLHttpRequest".to_string()),
            ("x-twitter-active-user", "yes".to_string()),
        ];

        Self {
            url: SEARCH_TIMELINE_URL,
            params,
            headers,
        }
    }

    /// Convert the header list into a `reqwest` header map.
    ///
    /// Fails with [`ScrapeError::Header`] when a value contains bytes
    /// an HTTP header cannot carry (control characters in a query, for
    /// example).
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for &(name, ref value) in &self.headers {
            let value =
                HeaderValue::from_str(value).map_err(|_| ScrapeError::Header { name })?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchCriteria;

    fn compiled(all_words: &str) -> CompiledQuery {
        SearchCriteria::new().with_all_words(all_words).compile()
    }

    #[test]
    fn test_first_page_request_has_fixed_params_and_no_cursor() {
        let request = SearchRequest::build(&compiled("nba raptors"), "", None);

        assert_eq!(request.url, "https://twitter.com/i/search/timeline");
        assert_eq!(request.param("vertical"), Some("default"));
        assert_eq!(request.param("src"), Some("typd"));
        assert_eq!(request.param("q"), Some("nba raptors"));
        assert_eq!(request.param("l"), Some(""));
        assert_eq!(request.param("include_available_features"), Some("1"));
        assert_eq!(request.param("include_entities"), Some("1"));
        assert_eq!(request.param("include_new_items_bar"), Some("true"));
        assert_eq!(request.param("max_position"), None);
    }

    #[test]
    fn test_follow_up_request_carries_cursor() {
        let request = SearchRequest::build(
            &compiled("nba"),
            "en",
            Some("TWEET-1100-1200-abc"),
        );

        assert_eq!(request.param("l"), Some("en"));
        assert_eq!(request.param("max_position"), Some("TWEET-1100-1200-abc"));
        // Cursor rides last, after the fixed parameter block.
        assert_eq!(request.params.last().map(|(key, _)| *key), Some("max_position"));
    }

    #[test]
    fn test_referer_embeds_query_verbatim() {
        let query = SearchCriteria::new()
            .with_all_words("nba")
            .with_hashtags("raptors")
            .compile();
        let request = SearchRequest::build(&query, "", None);

        let referer = request
            .headers
            .iter()
            .find(|(name, _)| *name == "referer")
            .map(|(_, value)| value.as_str());
        // No percent-encoding; spaces and `#` pass through raw.
        assert_eq!(
            referer,
            Some("https://twitter.com/search?q=nba #raptors&src=typd")
        );
    }

    #[test]
    fn test_header_map_carries_browser_identity() {
        let request = SearchRequest::build(&compiled("nba"), "", None);
        let map = request.header_map().unwrap();

        assert_eq!(map.len(), 6);
        assert_eq!(
            map.get("accept").unwrap(),
            "application/json, text/javascript, */*; q=0.01"
        );
        assert_eq!(map.get("accept-language").unwrap(), "en-US,en;q=0.8");
        assert_eq!(map.get("x-requested-with").unwrap(), "XMLHttpRequest");
        assert_eq!(map.get("x-twitter-active-user").unwrap(), "yes");
        let user_agent = map.get("user-agent").unwrap().to_str().unwrap();
        assert!(user_agent.contains("Chrome/60.0.3112.78"));
    }

    #[test]
    fn test_header_map_rejects_control_characters() {
        let query = CompiledQuery::default();
        let mut request = SearchRequest::build(&query, "", None);
        request
            .headers
            .push(("x-test", "line\nbreak".to_string()));

        match request.header_map() {
            Err(ScrapeError::Header { name }) => assert_eq!(name, "x-test"),
            other => panic!("expected header error, got {other:?}"),
        }
    }
}
