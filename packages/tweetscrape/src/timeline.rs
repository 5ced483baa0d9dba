//! Timeline endpoint access and pagination.
//!
//! [`SearchExecutor`] is the seam between query compilation and the
//! network: anything that can turn a [`SearchRequest`] into a
//! [`TimelineResponse`] can run a search. [`TimelineClient`] is the
//! real HTTP implementation; tests drive the same loop through the
//! mock in [`crate::testing`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::query::{CompiledQuery, SearchCriteria};
use crate::request::SearchRequest;
use crate::tweet::{parse_stream, Tweet};

/// JSON envelope the timeline endpoint wraps each page in.
///
/// `min_position` is the resume cursor: it rides as `max_position` on
/// the next request. Tweets themselves arrive pre-rendered in
/// `items_html`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineResponse {
    /// Cursor for the follow-up request, when the server supplied one.
    #[serde(default)]
    pub min_position: Option<String>,
    /// Whether the server claims more pages exist.
    #[serde(default)]
    pub has_more_items: bool,
    /// Rendered stream items.
    #[serde(default)]
    pub items_html: String,
}

/// Executes one timeline page fetch.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Fetch a single result page for the given request.
    async fn fetch_page(&self, request: &SearchRequest) -> Result<TimelineResponse>;
}

/// Everything one search run produced.
#[derive(Debug)]
pub struct SearchResults {
    /// The compiled query the pages were fetched for.
    pub query: CompiledQuery,
    /// Tweets from all fetched pages, in stream order.
    pub tweets: Vec<Tweet>,
    /// Pages actually fetched (stops early when the stream dries up).
    pub pages_fetched: usize,
}

/// Compile the criteria and fetch up to `criteria.pages` result pages,
/// threading the resume cursor between requests.
///
/// Stops early when the server reports no further items or stops
/// handing out a cursor. A transport or decode failure aborts the run;
/// tweets from earlier pages are not returned in that case.
pub async fn search<E>(executor: &E, criteria: &SearchCriteria) -> Result<SearchResults>
where
    E: SearchExecutor + ?Sized,
{
    let query = criteria.compile();
    let mut tweets: Vec<Tweet> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched = 0;

    for page in 0..criteria.pages {
        let request = SearchRequest::build(&query, &criteria.language, cursor.as_deref());
        let response = executor.fetch_page(&request).await?;
        pages_fetched += 1;

        let mut page_tweets = parse_stream(&response.items_html);
        info!(
            page = page + 1,
            tweets = page_tweets.len(),
            "fetched timeline page"
        );
        tweets.append(&mut page_tweets);

        if !response.has_more_items || response.min_position.is_none() {
            break;
        }
        cursor = response.min_position;
    }

    Ok(SearchResults {
        query,
        tweets,
        pages_fetched,
    })
}

/// Inter-page delay, to stay polite toward the endpoint.
const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(250);

/// HTTP implementation of [`SearchExecutor`] against the live endpoint.
pub struct TimelineClient {
    client: reqwest::Client,
    page_delay: Duration,
}

impl TimelineClient {
    /// Build a client with a 30 second request timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use an already configured `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    /// Override the delay between consecutive page fetches.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Compile, fetch and parse in one call.
    pub async fn search_tweets(&self, criteria: &SearchCriteria) -> Result<SearchResults> {
        search(self, criteria).await
    }
}

#[async_trait]
impl SearchExecutor for TimelineClient {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<TimelineResponse> {
        // A cursor marks a follow-up page; pause before hitting the
        // endpoint again.
        if request.param("max_position").is_some() && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        let headers = request.header_map()?;
        debug!(
            url = request.url,
            query = request.param("q").unwrap_or(""),
            cursor = request.param("max_position").unwrap_or(""),
            "requesting timeline page"
        );

        let response = self
            .client
            .get(request.url)
            .headers(headers)
            .query(&request.params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let envelope: TimelineResponse = serde_json::from_str(&body)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_deserializes_full_payload() {
        let body = r#"{
            "min_position": "TWEET-1100-1200-abc",
            "has_more_items": true,
            "items_html": "<li class=\"js-stream-item\"></li>",
            "new_latent_count": 0
        }"#;

        let envelope: TimelineResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.min_position.as_deref(), Some("TWEET-1100-1200-abc"));
        assert!(envelope.has_more_items);
        assert!(envelope.items_html.contains("js-stream-item"));
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let envelope: TimelineResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.min_position, None);
        assert!(!envelope.has_more_items);
        assert!(envelope.items_html.is_empty());
    }

    #[test]
    fn test_envelope_accepts_null_cursor() {
        let body = r#"{"min_position": null, "has_more_items": false, "items_html": ""}"#;
        let envelope: TimelineResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.min_position, None);
    }

    #[tokio::test]
    #[ignore] // hits the live endpoint
    async fn test_live_timeline_fetch() {
        let criteria = SearchCriteria::new()
            .with_hashtags("rustlang")
            .with_pages(1);
        let client = TimelineClient::new().unwrap();

        let results = client.search_tweets(&criteria).await.unwrap();
        assert_eq!(results.pages_fetched, 1);
    }
}
