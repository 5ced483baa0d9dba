//! Tweet extraction from timeline HTML fragments.
//!
//! The timeline endpoint returns rendered stream items in its
//! `items_html` field rather than structured records, so tweets are
//! recovered with CSS selectors over the fragment. Items that do not
//! carry a tweet id (ads, separators, half-rendered entries) are
//! skipped rather than reported as errors.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref HASHTAG_REGEX: Regex = Regex::new(r"#\w+").unwrap();
    static ref MENTION_REGEX: Regex = Regex::new(r"@\w+").unwrap();
}

/// One tweet recovered from a timeline stream item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    /// Numeric tweet id, as a string.
    pub id: String,
    /// Author's screen name, without the leading `@`.
    pub screen_name: String,
    /// Author's numeric user id, as a string.
    pub user_id: String,
    /// Site-relative permalink, e.g. `/marvel/status/1100`.
    pub permalink: String,
    /// Tweet timestamp, when the item carried one.
    pub created_at: Option<DateTime<Utc>>,
    /// Rendered tweet text, including inline link labels.
    pub text: String,
    /// Reply count at scrape time.
    pub replies: u64,
    /// Retweet count at scrape time.
    pub retweets: u64,
    /// Favorite count at scrape time.
    pub favorites: u64,
    /// `#hashtags` found in the text, in order of appearance.
    pub hashtags: Vec<String>,
    /// `@mentions` found in the text, in order of appearance.
    pub mentions: Vec<String>,
    /// Expanded URLs of links embedded in the tweet.
    pub links: Vec<String>,
}

/// Extract every tweet from an `items_html` timeline fragment.
pub fn parse_stream(items_html: &str) -> Vec<Tweet> {
    let document = Html::parse_fragment(items_html);
    let tweet_selector = match Selector::parse("li.js-stream-item div.tweet") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let tweets: Vec<Tweet> = document
        .select(&tweet_selector)
        .filter_map(extract_tweet)
        .collect();

    tracing::debug!(tweets = tweets.len(), "parsed timeline fragment");
    tweets
}

/// Build a [`Tweet`] from one `div.tweet` element. Returns `None` when
/// the element carries no tweet id.
fn extract_tweet(item: ElementRef<'_>) -> Option<Tweet> {
    let attrs = item.value();
    let id = attrs.attr("data-tweet-id")?.to_string();
    let screen_name = attrs.attr("data-screen-name").unwrap_or_default().to_string();
    let user_id = attrs.attr("data-user-id").unwrap_or_default().to_string();
    let permalink = attrs.attr("data-permalink-path").unwrap_or_default().to_string();

    let text = tweet_text(item);
    let hashtags = find_all(&HASHTAG_REGEX, &text);
    let mentions = find_all(&MENTION_REGEX, &text);

    Some(Tweet {
        id,
        screen_name,
        user_id,
        permalink,
        created_at: tweet_time(item),
        text,
        replies: action_count(item, "reply"),
        retweets: action_count(item, "retweet"),
        favorites: action_count(item, "favorite"),
        hashtags,
        mentions,
        links: expanded_links(item),
    })
}

/// Timestamp from the item's `_timestamp` marker, millisecond epoch.
fn tweet_time(item: ElementRef<'_>) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("span._timestamp").ok()?;
    let millis: i64 = item
        .select(&selector)
        .next()?
        .value()
        .attr("data-time-ms")?
        .parse()
        .ok()?;
    DateTime::from_timestamp_millis(millis)
}

/// Rendered text content of the tweet body.
fn tweet_text(item: ElementRef<'_>) -> String {
    let selector = match Selector::parse("p.tweet-text") {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };
    item.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Engagement count for one action (`reply`, `retweet` or `favorite`).
/// Missing or malformed counters read as zero.
fn action_count(item: ElementRef<'_>, action: &str) -> u64 {
    let selector = match Selector::parse(&format!(
        "span.ProfileTweet-action--{action} span.ProfileTweet-actionCount"
    )) {
        Ok(selector) => selector,
        Err(_) => return 0,
    };
    item.select(&selector)
        .next()
        .and_then(|el| el.value().attr("data-tweet-stat-count"))
        .and_then(|count| count.parse().ok())
        .unwrap_or(0)
}

/// Expanded URLs of embedded links.
fn expanded_links(item: ElementRef<'_>) -> Vec<String> {
    let selector = match Selector::parse("a[data-expanded-url]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    item.select(&selector)
        .filter_map(|el| el.value().attr("data-expanded-url"))
        .map(str::to_string)
        .collect()
}

fn find_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|found| found.as_str().to_string())
        .collect()
}
