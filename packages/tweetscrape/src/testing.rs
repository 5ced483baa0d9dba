//! Testing utilities including a mock search executor.
//!
//! Useful for testing pagination and query handling without touching
//! the live timeline endpoint.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};
use crate::request::SearchRequest;
use crate::timeline::{SearchExecutor, TimelineResponse};

/// A mock executor for testing.
///
/// Serves queued timeline pages first to last and records every request
/// it sees, so cursor threading and page budgets can be asserted.
#[derive(Default)]
pub struct MockExecutor {
    /// Queued responses, served in order
    pages: Arc<RwLock<Vec<TimelineResponse>>>,

    /// When set, every fetch fails with this API error
    failure: Arc<RwLock<Option<(u16, String)>>>,

    /// Request tracking for assertions
    requests: Arc<RwLock<Vec<ExecutedRequest>>>,
}

/// Record of one request the mock served.
#[derive(Debug, Clone)]
pub struct ExecutedRequest {
    /// The `q` parameter.
    pub query: String,
    /// The `l` parameter.
    pub language: String,
    /// The `max_position` parameter, absent on first-page requests.
    pub cursor: Option<String>,
}

impl MockExecutor {
    /// Create a mock with an empty page queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one timeline page.
    pub fn with_page(self, page: TimelineResponse) -> Self {
        self.pages.write().unwrap().push(page);
        self
    }

    /// Make every fetch fail with an API error.
    pub fn with_failure(self, status: u16, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some((status, message.into()));
        self
    }

    /// Get all requests made to this mock.
    pub fn requests(&self) -> Vec<ExecutedRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl SearchExecutor for MockExecutor {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<TimelineResponse> {
        self.requests.write().unwrap().push(ExecutedRequest {
            query: request.param("q").unwrap_or_default().to_string(),
            language: request.param("l").unwrap_or_default().to_string(),
            cursor: request.param("max_position").map(str::to_string),
        });

        if let Some((status, message)) = self.failure.read().unwrap().clone() {
            return Err(ScrapeError::Api { status, message });
        }

        let mut pages = self.pages.write().unwrap();
        if pages.is_empty() {
            // Drained queue reads as an exhausted stream.
            return Ok(TimelineResponse {
                min_position: None,
                has_more_items: false,
                items_html: String::new(),
            });
        }
        Ok(pages.remove(0))
    }
}

/// Build one timeline page; a cursor implies more pages follow.
pub fn stream_page(cursor: Option<&str>, items_html: impl Into<String>) -> TimelineResponse {
    TimelineResponse {
        min_position: cursor.map(str::to_string),
        has_more_items: cursor.is_some(),
        items_html: items_html.into(),
    }
}

/// Minimal rendered stream item for one tweet.
pub fn sample_tweet_item(id: &str, screen_name: &str, text: &str) -> String {
    format!(
        r#"<li class="js-stream-item">
          <div class="tweet" data-tweet-id="{id}" data-screen-name="{screen_name}"
               data-user-id="42" data-permalink-path="/{screen_name}/status/{id}">
            <p class="tweet-text">{text}</p>
          </div>
        </li>"#
    )
}
