//! Typed errors for the scraping library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! match on individual failure modes.

use thiserror::Error;

/// Errors that can occur while executing a timeline search.
///
/// Query compilation and request building are total and never produce
/// these; every variant originates in the network executor.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// HTTP transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("timeline API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A header value has no HTTP representation (control characters in
    /// the compiled query leak into the referer)
    #[error("invalid value for header {name}")]
    Header { name: &'static str },

    /// Timeline envelope was not valid JSON
    #[error("malformed timeline response: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
