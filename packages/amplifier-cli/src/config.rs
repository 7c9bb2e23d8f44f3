//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use amplifier::{PromotedSlot, RunConfig, SourceSpec};

/// Credentials plus the full run configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: String,
    pub identifier: String,
    pub password: String,
    pub run: RunConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Source declarations are comma-separated lists of feed/list
    /// references (bsky.app URLs or `at://` URIs); a `promo:` prefix
    /// marks a promoted source.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut run = RunConfig::new()
            .with_recency_window(chrono::Duration::hours(parse_or("HOURS_BACK", 3)?))
            .with_run_cap(parse_or("MAX_PER_RUN", 100)?)
            .with_per_author_cap(parse_or("MAX_PER_USER", 3)?)
            .with_inter_action_delay(sleep_duration(parse_or("SLEEP_SECONDS", 2.0)?)?)
            .with_state_file(
                env::var("STATE_FILE").unwrap_or_else(|_| "amplify_state.json".to_string()),
            );

        run.member_ceiling = parse_or("LIST_MEMBER_LIMIT", 1500)?;
        run.per_member_ceiling = parse_or("AUTHOR_POSTS_PER_MEMBER", 10)?;
        run.feed_item_ceiling = parse_or("FEED_MAX_ITEMS", 500)?;
        run.search_item_ceiling = parse_or("SEARCH_MAX_ITEMS", 100)?;

        for (i, (reference, promoted)) in split_refs(&env_or_empty("FEEDS")).enumerate() {
            let spec = SourceSpec::feed(format!("feed-{}", i + 1), reference);
            run.sources.push(if promoted { spec.promoted() } else { spec });
        }
        for (i, (reference, promoted)) in split_refs(&env_or_empty("LISTS")).enumerate() {
            let spec = SourceSpec::list(format!("list-{}", i + 1), reference);
            run.sources.push(if promoted { spec.promoted() } else { spec });
        }
        if let Ok(query) = env::var("SEARCH_QUERY") {
            if !query.trim().is_empty() {
                run.sources.push(SourceSpec::search("search", query.trim()));
            }
        }

        for (reference, _) in split_refs(&env_or_empty("EXCLUDE_LISTS")) {
            run.exclusion_lists.push(reference);
        }

        if let Ok(uri) = env::var("PINNED_POST") {
            if !uri.trim().is_empty() {
                run.promoted_slots.push(PromotedSlot::Post {
                    subject_uri: uri.trim().to_string(),
                });
            }
        }
        for (author, _) in split_refs(&env_or_empty("PROMOTED_AUTHORS")) {
            run.promoted_slots.push(PromotedSlot::Author {
                author_key: author.to_ascii_lowercase(),
            });
        }

        Ok(Self {
            service: env::var("BSKY_SERVICE")
                .unwrap_or_else(|_| bsky_client::DEFAULT_SERVICE.to_string()),
            identifier: env::var("BSKY_IDENTIFIER").context("BSKY_IDENTIFIER must be set")?,
            password: env::var("BSKY_PASSWORD").context("BSKY_PASSWORD must be set")?,
            run,
        })
    }
}

fn env_or_empty(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

/// Split a comma-separated reference list, detecting the `promo:` prefix.
fn split_refs(raw: &str) -> impl Iterator<Item = (String, bool)> + '_ {
    raw.split(',').filter_map(|part| {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        match part.strip_prefix("promo:") {
            Some(rest) => Some((rest.trim().to_string(), true)),
            None => Some((part.to_string(), false)),
        }
    })
}

/// `Duration::from_secs_f64` panics on negative or non-finite input, so
/// validate before converting.
fn sleep_duration(seconds: f64) -> Result<std::time::Duration> {
    anyhow::ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "SLEEP_SECONDS must be a non-negative number"
    );
    Ok(std::time::Duration::from_secs_f64(seconds))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}
