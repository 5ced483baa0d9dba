//! Boolean search query compilation.
//!
//! Each filter kind contributes one whitespace-separated fragment to the
//! final query string, e.g.:
//!
//! `Election India NDA "BJP" 2019 OR 2018 -Asia #India OR #BJP
//! from:narendramodi to:NITIAayog @NDTV since:2017-08-01 until:2019-06-15`
//!
//! - All of these words: passed through as-is
//! - This exact phrase: wrapped in `"` quotation marks
//! - Any of these words: `OR`-separated
//! - None of these words: `-` prefix per term
//! - Hashtags: `#` prefix per term, `OR`-separated
//! - From/to these accounts: `from:`/`to:` prefix per term, `OR`-separated
//! - Mentioning these accounts: `@` prefix per term, `OR`-separated
//! - Near this place: `near:` plus a `within:` radius with `mi` suffix
//! - Date range: `since:`/`until:` with dates as `YYYY-MM-DD`
//!
//! Filters evaluate in the fixed order above; a filter left empty (or
//! all whitespace) contributes nothing.

use std::fmt;

use chrono::{NaiveDate, Utc};

/// Calendar format accepted by the date-range filter.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default search radius when a near place is given without a distance.
const DEFAULT_RADIUS: &str = "15mi";

/// Check a date string against the `YYYY-MM-DD` calendar format.
///
/// Returns true iff the string parses as a real calendar date. Invalid
/// input records a warning and returns false; callers skip or default
/// the affected term instead of failing.
pub fn is_valid_date(text: &str) -> bool {
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(input = %text, %error, "incorrect date format, should be YYYY-MM-DD");
            false
        }
    }
}

/// A fully assembled boolean search string.
///
/// Produced by [`SearchCriteria::compile`]: the single-space join of
/// every term the filters emitted, in filter order. Empty when no filter
/// produced a term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledQuery(String);

impl CompiledQuery {
    /// The query as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no filter produced a term.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured search criteria, compiled into a single boolean query.
///
/// Build once with the `with_*` methods and treat as immutable
/// afterwards. Every filter field is optional; empty means "not
/// filtering on this".
///
/// # Example
///
/// ```rust,ignore
/// use tweetscrape::SearchCriteria;
///
/// let query = SearchCriteria::new()
///     .with_all_words("avengers endgame")
///     .with_any_words("spiderman ironman")
///     .with_excluded_words("spoilers")
///     .compile();
///
/// assert_eq!(query.as_str(), "avengers endgame spiderman OR ironman -spoilers");
/// ```
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    /// All of these words, whitespace separated.
    pub all_words: String,
    /// This exact phrase.
    pub exact_phrase: String,
    /// Any of these words, whitespace separated.
    pub any_words: String,
    /// None of these words, whitespace separated.
    pub excluded_words: String,
    /// These hashtags, with or without the leading `#`.
    pub hashtags: String,
    /// From these accounts, with or without the `from:` operator.
    pub from_accounts: String,
    /// To these accounts, with or without the `to:` operator.
    pub to_accounts: String,
    /// Mentioning these accounts, with or without the leading `@`.
    pub mentions: String,
    /// Near this place.
    pub near_place: String,
    /// Search radius around the place, `mi` suffix included (e.g. `2mi`).
    pub near_distance: String,
    /// From this date, `YYYY-MM-DD`.
    pub from_date: String,
    /// Till this date, `YYYY-MM-DD`.
    pub till_date: String,
    /// Result pages to fetch.
    pub pages: usize,
    /// Language code restriction (e.g. `en`), empty for any language.
    pub language: String,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCriteria {
    /// Create empty criteria: no filters, two result pages, any language.
    pub fn new() -> Self {
        Self {
            all_words: String::new(),
            exact_phrase: String::new(),
            any_words: String::new(),
            excluded_words: String::new(),
            hashtags: String::new(),
            from_accounts: String::new(),
            to_accounts: String::new(),
            mentions: String::new(),
            near_place: String::new(),
            near_distance: String::new(),
            from_date: String::new(),
            till_date: String::new(),
            pages: 2,
            language: String::new(),
        }
    }

    /// Require all of these words.
    pub fn with_all_words(mut self, words: impl Into<String>) -> Self {
        self.all_words = words.into();
        self
    }

    /// Require this exact phrase.
    pub fn with_exact_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.exact_phrase = phrase.into();
        self
    }

    /// Require any of these words.
    pub fn with_any_words(mut self, words: impl Into<String>) -> Self {
        self.any_words = words.into();
        self
    }

    /// Exclude these words.
    pub fn with_excluded_words(mut self, words: impl Into<String>) -> Self {
        self.excluded_words = words.into();
        self
    }

    /// Require any of these hashtags.
    pub fn with_hashtags(mut self, hashtags: impl Into<String>) -> Self {
        self.hashtags = hashtags.into();
        self
    }

    /// Restrict to tweets from any of these accounts.
    pub fn with_from_accounts(mut self, accounts: impl Into<String>) -> Self {
        self.from_accounts = accounts.into();
        self
    }

    /// Restrict to tweets to any of these accounts.
    pub fn with_to_accounts(mut self, accounts: impl Into<String>) -> Self {
        self.to_accounts = accounts.into();
        self
    }

    /// Restrict to tweets mentioning any of these accounts.
    pub fn with_mentions(mut self, accounts: impl Into<String>) -> Self {
        self.mentions = accounts.into();
        self
    }

    /// Restrict to tweets near this place.
    pub fn with_near_place(mut self, place: impl Into<String>) -> Self {
        self.near_place = place.into();
        self
    }

    /// Search radius around the near place (used only with a place).
    pub fn with_near_distance(mut self, distance: impl Into<String>) -> Self {
        self.near_distance = distance.into();
        self
    }

    /// Restrict to tweets since this date (`YYYY-MM-DD`).
    pub fn with_from_date(mut self, date: impl Into<String>) -> Self {
        self.from_date = date.into();
        self
    }

    /// Restrict to tweets until this date (`YYYY-MM-DD`).
    pub fn with_till_date(mut self, date: impl Into<String>) -> Self {
        self.till_date = date.into();
        self
    }

    /// Set the number of result pages to fetch.
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Restrict results to a language code (e.g. `en`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Compile the criteria into one boolean query string.
    ///
    /// Filters evaluate in the fixed order documented at module level;
    /// every term that survives is joined with a single space. Total
    /// over the whole input domain: malformed filter values degrade to
    /// an omitted term, never an error.
    pub fn compile(&self) -> CompiledQuery {
        let mut terms: Vec<String> = Vec::new();

        if !self.all_words.trim().is_empty() {
            terms.push(self.all_words.clone());
        }
        if let Some(term) = quoted_phrase(&self.exact_phrase) {
            terms.push(term);
        }
        if let Some(term) = any_of(&self.any_words) {
            terms.push(term);
        }
        if let Some(term) = excluded(&self.excluded_words) {
            terms.push(term);
        }
        if let Some(term) = prefixed_alternatives(&self.hashtags, "#") {
            terms.push(term);
        }
        if let Some(term) = prefixed_alternatives(&self.from_accounts, "from:") {
            terms.push(term);
        }
        if let Some(term) = prefixed_alternatives(&self.to_accounts, "to:") {
            terms.push(term);
        }
        if let Some(term) = prefixed_alternatives(&self.mentions, "@") {
            terms.push(term);
        }
        if let Some((near, within)) = near_terms(&self.near_place, &self.near_distance) {
            terms.push(near);
            terms.push(within);
        }
        if let Some((since, until)) = date_terms(&self.from_date, &self.till_date) {
            terms.push(since);
            terms.push(until);
        }

        let query = terms.join(" ");
        tracing::info!(query = %query, "compiled search query");

        CompiledQuery(query)
    }
}

/// Wrap the phrase in double quotes.
fn quoted_phrase(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(format!("\"{raw}\""))
}

/// `OR`-join the words. Fires only when the raw value contains a literal
/// space character; a single bare word never produces a term.
fn any_of(raw: &str) -> Option<String> {
    if !raw.contains(' ') {
        return None;
    }
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" OR "))
}

/// Prefix every word with the `-` exclusion operator.
fn excluded(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|word| format!("-{word}"))
        .collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

/// Prefix every token that does not already carry the operator, then
/// `OR`-join. Shared by the hashtag, from/to account, and mention
/// filters.
fn prefixed_alternatives(raw: &str, prefix: &str) -> Option<String> {
    let tokens: Vec<String> = raw
        .split_whitespace()
        .map(|token| {
            if token.starts_with(prefix) {
                token.to_string()
            } else {
                format!("{prefix}{token}")
            }
        })
        .collect();
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(" OR "))
}

/// `near:` term paired with a `within:` radius, defaulting to 15 miles.
fn near_terms(place: &str, distance: &str) -> Option<(String, String)> {
    if place.trim().is_empty() {
        return None;
    }
    let near = format!("near:{place}");
    let within = if distance.trim().is_empty() {
        format!("within:{DEFAULT_RADIUS}")
    } else {
        format!("within:{distance}")
    };
    Some((near, within))
}

/// `since:` term paired with an `until:` term. Requires a valid from
/// date; a missing or invalid till date falls back to today (UTC).
fn date_terms(from: &str, till: &str) -> Option<(String, String)> {
    if from.trim().is_empty() || !is_valid_date(from) {
        return None;
    }
    let since = format!("since:{from}");
    let until = if !till.trim().is_empty() && is_valid_date(till) {
        format!("until:{till}")
    } else {
        format!("until:{}", Utc::now().format(DATE_FORMAT))
    };
    Some((since, until))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> String {
        Utc::now().format(DATE_FORMAT).to_string()
    }

    #[test]
    fn test_empty_criteria_compile_to_empty_query() {
        let query = SearchCriteria::new().compile();
        assert!(query.is_empty());
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_whitespace_only_fields_are_ignored() {
        let query = SearchCriteria::new()
            .with_all_words("   ")
            .with_exact_phrase(" \t ")
            .with_any_words("   ")
            .with_excluded_words("  ")
            .with_hashtags(" \t ")
            .with_near_place("  ")
            .compile();
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_all_words_pass_through_verbatim() {
        let query = SearchCriteria::new()
            .with_all_words("avengers infinity war")
            .compile();
        assert_eq!(query.as_str(), "avengers infinity war");
    }

    #[test]
    fn test_exact_phrase_is_quoted() {
        let query = SearchCriteria::new()
            .with_exact_phrase("avengers endgame")
            .compile();
        assert_eq!(query.as_str(), "\"avengers endgame\"");
    }

    #[test]
    fn test_any_words_join_with_or() {
        let query = SearchCriteria::new()
            .with_any_words("spiderman ironman thor")
            .compile();
        assert_eq!(query.as_str(), "spiderman OR ironman OR thor");
    }

    #[test]
    fn test_single_any_word_is_dropped() {
        // The alternatives filter only activates on a multi-word value.
        let query = SearchCriteria::new().with_any_words("spiderman").compile();
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_any_word_with_trailing_space_yields_bare_term() {
        // The space gate is literal: a trailing space activates the
        // filter even though only one word remains after splitting.
        let query = SearchCriteria::new().with_any_words("spiderman ").compile();
        assert_eq!(query.as_str(), "spiderman");
    }

    #[test]
    fn test_excluded_words_get_minus_prefix() {
        let query = SearchCriteria::new()
            .with_excluded_words("spoilers leaks")
            .compile();
        assert_eq!(query.as_str(), "-spoilers -leaks");
    }

    #[test]
    fn test_hashtags_join_with_or() {
        let query = SearchCriteria::new()
            .with_hashtags("FakeNews Trump")
            .compile();
        assert_eq!(query.as_str(), "#FakeNews OR #Trump");
    }

    #[test]
    fn test_existing_operator_prefix_is_kept() {
        let query = SearchCriteria::new()
            .with_hashtags("#raptors nba")
            .compile();
        assert_eq!(query.as_str(), "#raptors OR #nba");

        let query = SearchCriteria::new()
            .with_from_accounts("from:marvel dc")
            .compile();
        assert_eq!(query.as_str(), "from:marvel OR from:dc");
    }

    #[test]
    fn test_account_filters_tolerate_stray_whitespace() {
        let query = SearchCriteria::new()
            .with_all_words("avengers marvel")
            .with_hashtags("avengers")
            .with_from_accounts("marvel ")
            .compile();
        assert_eq!(query.as_str(), "avengers marvel #avengers from:marvel");
    }

    #[test]
    fn test_mentions_get_at_prefix() {
        let query = SearchCriteria::new().with_mentions("NDTV ANI").compile();
        assert_eq!(query.as_str(), "@NDTV OR @ANI");
    }

    #[test]
    fn test_near_place_defaults_radius_to_15_miles() {
        let query = SearchCriteria::new()
            .with_hashtags("raptors")
            .with_near_place("toronto")
            .compile();
        assert_eq!(query.as_str(), "#raptors near:toronto within:15mi");
    }

    #[test]
    fn test_near_place_keeps_explicit_radius() {
        let query = SearchCriteria::new()
            .with_near_place("toronto")
            .with_near_distance("2mi")
            .compile();
        assert_eq!(query.as_str(), "near:toronto within:2mi");
    }

    #[test]
    fn test_near_distance_without_place_is_ignored() {
        let query = SearchCriteria::new().with_near_distance("2mi").compile();
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_date_range_with_both_dates() {
        let query = SearchCriteria::new()
            .with_from_date("2019-03-01")
            .with_till_date("2019-06-01")
            .compile();
        assert_eq!(query.as_str(), "since:2019-03-01 until:2019-06-01");
    }

    #[test]
    fn test_missing_till_date_defaults_to_today() {
        let query = SearchCriteria::new()
            .with_from_date("2019-03-01")
            .compile();
        assert_eq!(
            query.as_str(),
            format!("since:2019-03-01 until:{}", today())
        );
    }

    #[test]
    fn test_invalid_till_date_falls_back_to_today() {
        let query = SearchCriteria::new()
            .with_from_date("2019-03-01")
            .with_till_date("junk")
            .compile();
        assert_eq!(
            query.as_str(),
            format!("since:2019-03-01 until:{}", today())
        );
    }

    #[test]
    fn test_invalid_from_date_skips_date_range() {
        let query = SearchCriteria::new()
            .with_from_date("03-01-2019")
            .with_till_date("2019-06-01")
            .compile();
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_till_date_without_from_date_is_ignored() {
        let query = SearchCriteria::new()
            .with_till_date("2019-06-01")
            .compile();
        assert_eq!(query.as_str(), "");
    }

    #[test]
    fn test_combined_filters_keep_fixed_order() {
        // Builder calls deliberately run in reverse of the compile
        // order; the output order must not change.
        let query = SearchCriteria::new()
            .with_from_date("2019-01-01")
            .with_till_date("2019-02-01")
            .with_near_distance("5mi")
            .with_near_place("delhi")
            .with_mentions("NDTV")
            .with_to_accounts("NITIAayog")
            .with_from_accounts("narendramodi")
            .with_hashtags("India BJP")
            .with_excluded_words("Asia")
            .with_any_words("2019 2018")
            .with_exact_phrase("BJP")
            .with_all_words("Election India NDA")
            .compile();

        assert_eq!(
            query.as_str(),
            "Election India NDA \"BJP\" 2019 OR 2018 -Asia #India OR #BJP \
             from:narendramodi to:NITIAayog @NDTV near:delhi within:5mi \
             since:2019-01-01 until:2019-02-01"
        );
    }

    #[test]
    fn test_compile_matches_worked_example() {
        let query = SearchCriteria::new()
            .with_all_words("avengers endgame")
            .with_any_words("spiderman ironman")
            .with_excluded_words("spoilers")
            .compile();
        assert_eq!(
            query.as_str(),
            "avengers endgame spiderman OR ironman -spoilers"
        );
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2019-06-15"));
        assert!(is_valid_date("2000-01-01"));
        assert!(!is_valid_date("2019-06-31"));
        assert!(!is_valid_date("15-06-2019"));
        assert!(!is_valid_date("2019/06/15"));
        assert!(!is_valid_date("tomorrow"));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn test_default_pages_is_two() {
        assert_eq!(SearchCriteria::new().pages, 2);
        assert_eq!(SearchCriteria::default().pages, 2);
    }
}
