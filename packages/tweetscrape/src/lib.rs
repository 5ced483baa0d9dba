//! Twitter Legacy Search Scraper
//!
//! Compiles structured search criteria into the boolean query syntax the
//! twitter.com search box understands, then pages through the legacy
//! search timeline endpoint and extracts tweets from the rendered HTML
//! it returns.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tweetscrape::{search, SearchCriteria, TimelineClient};
//!
//! let criteria = SearchCriteria::new()
//!     .with_all_words("avengers endgame")
//!     .with_any_words("spiderman ironman")
//!     .with_excluded_words("spoilers")
//!     .with_pages(2);
//!
//! // Query string alone, no network:
//! let query = criteria.compile();
//! assert_eq!(query.as_str(), "avengers endgame spiderman OR ironman -spoilers");
//!
//! // Full search against the live endpoint:
//! let client = TimelineClient::new()?;
//! let results = client.search_tweets(&criteria).await?;
//! println!("{} tweets", results.tweets.len());
//! ```
//!
//! # Modules
//!
//! - [`query`] - Search criteria and boolean query compilation
//! - [`request`] - Wire-level request description (params + headers)
//! - [`timeline`] - Endpoint access, pagination, executor trait
//! - [`tweet`] - Tweet extraction from rendered stream HTML
//! - [`testing`] - Mock executor for tests

pub mod error;
pub mod query;
pub mod request;
pub mod testing;
pub mod timeline;
pub mod tweet;

// Re-export core types at crate root
pub use error::{Result, ScrapeError};
pub use query::{is_valid_date, CompiledQuery, SearchCriteria};
pub use request::{SearchRequest, SEARCH_SOURCE, SEARCH_TIMELINE_URL};
pub use timeline::{search, SearchExecutor, SearchResults, TimelineClient, TimelineResponse};
pub use tweet::{parse_stream, Tweet};

// Re-export testing utilities
pub use testing::MockExecutor;
