//! Command line search against the legacy search timeline.
//!
//! Each flag maps to one search filter; the compiled boolean query is
//! logged before any request goes out. With `--save`, results land as
//! JSON in `<query>_search` in the current directory.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetscrape::{SearchCriteria, TimelineClient};

#[derive(Parser)]
#[command(name = "tweetscrape")]
#[command(about = "Search tweets through the legacy search timeline")]
struct Cli {
    /// All of these words
    #[arg(long, default_value = "")]
    all: String,

    /// This exact phrase
    #[arg(long, default_value = "")]
    exact: String,

    /// Any of these words (whitespace separated)
    #[arg(long, default_value = "")]
    any: String,

    /// None of these words
    #[arg(long, default_value = "")]
    exclude: String,

    /// These hashtags
    #[arg(long, default_value = "")]
    hashtags: String,

    /// From these accounts
    #[arg(long, default_value = "")]
    from: String,

    /// To these accounts
    #[arg(long, default_value = "")]
    to: String,

    /// Mentioning these accounts
    #[arg(long, default_value = "")]
    mentions: String,

    /// Near this place
    #[arg(long, default_value = "")]
    near: String,

    /// Search radius around the place, miles with `mi` suffix (e.g. 2mi)
    #[arg(long, default_value = "")]
    within: String,

    /// Since this date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    since: String,

    /// Until this date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    until: String,

    /// Language code restriction (e.g. en)
    #[arg(long, default_value = "")]
    language: String,

    /// Result pages to fetch
    #[arg(long, default_value_t = 2)]
    pages: usize,

    /// Save results as JSON to `<query>_search`
    #[arg(long)]
    save: bool,
}

impl Cli {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria::new()
            .with_all_words(self.all.clone())
            .with_exact_phrase(self.exact.clone())
            .with_any_words(self.any.clone())
            .with_excluded_words(self.exclude.clone())
            .with_hashtags(self.hashtags.clone())
            .with_from_accounts(self.from.clone())
            .with_to_accounts(self.to.clone())
            .with_mentions(self.mentions.clone())
            .with_near_place(self.near.clone())
            .with_near_distance(self.within.clone())
            .with_from_date(self.since.clone())
            .with_till_date(self.until.clone())
            .with_language(self.language.clone())
            .with_pages(self.pages)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tweetscrape=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let criteria = cli.criteria();

    let client = TimelineClient::new().context("Failed to create timeline client")?;
    let results = client
        .search_tweets(&criteria)
        .await
        .context("Search failed")?;

    for tweet in &results.tweets {
        println!("@{} [{}]: {}", tweet.screen_name, tweet.id, tweet.text);
    }
    println!(
        "{} tweets over {} pages",
        results.tweets.len(),
        results.pages_fetched
    );

    if cli.save {
        let file_name = format!("{}_search", results.query);
        let json = serde_json::to_string_pretty(&results.tweets)
            .context("Failed to serialize results")?;
        std::fs::write(&file_name, json)
            .with_context(|| format!("Failed to write {file_name}"))?;
        tracing::info!(file = %file_name, tweets = results.tweets.len(), "saved results");
    }

    Ok(())
}
