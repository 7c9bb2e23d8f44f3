//! Source connectors: feed, list-member, and search scans.
//!
//! Each connector turns one configured source into eligible candidates.
//! Connectors fail independently: a non-fatal fetch error is logged and
//! the source contributes zero candidates; only fatal errors (auth)
//! abort the run.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::builder::{self, BuildContext, RejectionCounts};
use crate::config::{RunConfig, SourceKind, SourceSpec};
use crate::error::{ApiResult, Result};
use crate::item::{ActorRef, RawItem};
use crate::traits::AmplifyApi;
use crate::types::{Candidate, ExclusionSet};
use crate::uri::{normalize_feed_ref, normalize_list_ref};

/// Build the exclusion set from the configured exclusion lists.
///
/// Exclusion lists are walked to at least 1000 members so a partially
/// loaded exclusion list cannot let a blocked author through.
pub async fn load_exclusions(api: &dyn AmplifyApi, config: &RunConfig) -> Result<ExclusionSet> {
    let mut set = ExclusionSet::new();

    for reference in &config.exclusion_lists {
        let list_uri = match normalize_list_ref(api, reference).await {
            Ok(Some(uri)) => uri,
            Ok(None) => {
                warn!(reference = %reference, "Invalid exclusion list reference, skipping");
                continue;
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(reference = %reference, error = %e, "Failed to normalize exclusion list, skipping");
                continue;
            }
        };

        match fetch_list_members(api, &list_uri, config.effective_member_ceiling()).await {
            Ok(members) => {
                info!(list = %list_uri, members = members.len(), "Loaded exclusion list");
                for member in members {
                    set.insert(member.handle.as_deref(), member.did.as_deref());
                }
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(list = %list_uri, error = %e, "Failed to load exclusion list, skipping");
            }
        }
    }

    Ok(set)
}

/// Scan every configured source and return all surviving candidates.
pub async fn collect_all(
    api: &dyn AmplifyApi,
    config: &RunConfig,
    exclusions: &ExclusionSet,
    now: DateTime<Utc>,
) -> Result<Vec<Candidate>> {
    let cutoff = now - config.recency_window;
    let mut all = Vec::new();

    for source in &config.sources {
        let ctx = BuildContext {
            exclusions,
            acting_did: api.acting_did(),
            cutoff,
            source_tag: &source.tag,
            promoted: source.promoted,
        };

        match collect_source(api, config, source, &ctx).await {
            Ok(candidates) => {
                info!(
                    source = %source.tag,
                    promoted = source.promoted,
                    candidates = candidates.len(),
                    "Source scan complete"
                );
                all.extend(candidates);
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(source = %source.tag, error = %e, "Source scan failed, contributing zero candidates");
            }
        }
    }

    Ok(all)
}

async fn collect_source(
    api: &dyn AmplifyApi,
    config: &RunConfig,
    source: &SourceSpec,
    ctx: &BuildContext<'_>,
) -> ApiResult<Vec<Candidate>> {
    match &source.kind {
        SourceKind::Feed { reference } => {
            let Some(feed_uri) = normalize_feed_ref(api, reference).await? else {
                warn!(source = %source.tag, reference = %reference, "Invalid feed reference, skipping");
                return Ok(Vec::new());
            };
            collect_feed(api, &feed_uri, config.feed_item_ceiling, ctx).await
        }
        SourceKind::List { reference } => {
            let Some(list_uri) = normalize_list_ref(api, reference).await? else {
                warn!(source = %source.tag, reference = %reference, "Invalid list reference, skipping");
                return Ok(Vec::new());
            };
            collect_list(api, &list_uri, config, ctx).await
        }
        SourceKind::Search { query } => {
            collect_search(api, query, config.search_item_ceiling, ctx).await
        }
    }
}

/// Paginate a feed by cursor until exhausted or the item ceiling is hit.
async fn collect_feed(
    api: &dyn AmplifyApi,
    feed_uri: &str,
    ceiling: u32,
    ctx: &BuildContext<'_>,
) -> ApiResult<Vec<Candidate>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = api.fetch_feed_page(feed_uri, cursor.as_deref()).await?;
        items.extend(page.items);
        cursor = page.cursor;
        if cursor.is_none() || items.len() >= ceiling as usize {
            break;
        }
    }
    items.truncate(ceiling as usize);

    Ok(sieve(items.iter().map(|i| i as &dyn RawItem), ctx))
}

/// Expand a list to its members, then scan each member's own timeline.
async fn collect_list(
    api: &dyn AmplifyApi,
    list_uri: &str,
    config: &RunConfig,
    ctx: &BuildContext<'_>,
) -> ApiResult<Vec<Candidate>> {
    let members = fetch_list_members(api, list_uri, config.effective_member_ceiling()).await?;
    debug!(list = %list_uri, members = members.len(), "Expanding list members");

    let mut candidates = Vec::new();
    for member in &members {
        let Some(actor) = member.did.as_deref().or(member.handle.as_deref()) else {
            continue;
        };
        match api
            .fetch_member_timeline(actor, config.per_member_ceiling)
            .await
        {
            Ok(items) => {
                candidates.extend(sieve(items.iter().map(|i| i as &dyn RawItem), ctx));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(actor = %actor, error = %e, "Member timeline fetch failed, skipping member");
            }
        }
    }

    Ok(candidates)
}

/// One bounded keyword query, no pagination.
async fn collect_search(
    api: &dyn AmplifyApi,
    query: &str,
    ceiling: u32,
    ctx: &BuildContext<'_>,
) -> ApiResult<Vec<Candidate>> {
    let posts = api.search(query, ceiling).await?;
    Ok(sieve(posts.iter().map(|p| p as &dyn RawItem), ctx))
}

/// Paginate list membership by cursor up to `limit` members.
async fn fetch_list_members(
    api: &dyn AmplifyApi,
    list_uri: &str,
    limit: u32,
) -> ApiResult<Vec<ActorRef>> {
    let mut members = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = api.fetch_list_page(list_uri, cursor.as_deref()).await?;
        members.extend(page.items);
        cursor = page.cursor;
        if cursor.is_none() || members.len() >= limit as usize {
            break;
        }
    }
    members.truncate(limit as usize);
    Ok(members)
}

/// Run the eligibility predicates over a batch of raw items.
fn sieve<'a>(
    items: impl Iterator<Item = &'a dyn RawItem>,
    ctx: &BuildContext<'_>,
) -> Vec<Candidate> {
    let mut counts = RejectionCounts::default();
    let mut candidates = Vec::new();

    for item in items {
        match builder::evaluate(item, ctx) {
            Ok(candidate) => candidates.push(candidate),
            Err(rejection) => counts.tally(rejection),
        }
    }

    debug!(
        source = %ctx.source_tag,
        accepted = candidates.len(),
        incomplete = counts.incomplete,
        boosts = counts.boosts,
        replies = counts.replies,
        quotes = counts.quotes,
        no_media = counts.no_media,
        excluded = counts.excluded,
        own_posts = counts.own_posts,
        no_timestamp = counts.no_timestamp,
        too_old = counts.too_old,
        "Sifted raw items"
    );

    candidates
}
