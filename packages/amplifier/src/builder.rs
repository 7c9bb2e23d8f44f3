//! Candidate builder: eligibility filtering of raw source items.
//!
//! Applies a fixed, ordered list of rejection predicates and converts
//! survivors into [`Candidate`] records. Rejections are returned as
//! typed reasons so connectors can log why items fell out of a scan.

use chrono::{DateTime, Utc};

use crate::item::{EmbedShape, RawItem};
use crate::types::{Candidate, ExclusionSet};

/// Why a raw item was rejected, in predicate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Missing URI, CID, or record payload
    Incomplete,
    /// The item is itself a repost/boost
    Boost,
    /// The record is a reply
    Reply,
    /// The record quotes another post (with or without extra media)
    Quote,
    /// No image or video embed (link cards do not qualify)
    NoMedia,
    /// Author is in the exclusion set
    Excluded,
    /// Author is the acting account itself
    OwnPost,
    /// No parsable creation timestamp in any probed field
    NoTimestamp,
    /// Creation timestamp older than the recency cutoff
    TooOld,
}

/// Per-scan tallies of rejection reasons, logged for diagnosis.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectionCounts {
    pub incomplete: u32,
    pub boosts: u32,
    pub replies: u32,
    pub quotes: u32,
    pub no_media: u32,
    pub excluded: u32,
    pub own_posts: u32,
    pub no_timestamp: u32,
    pub too_old: u32,
}

impl RejectionCounts {
    pub fn tally(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Incomplete => self.incomplete += 1,
            Rejection::Boost => self.boosts += 1,
            Rejection::Reply => self.replies += 1,
            Rejection::Quote => self.quotes += 1,
            Rejection::NoMedia => self.no_media += 1,
            Rejection::Excluded => self.excluded += 1,
            Rejection::OwnPost => self.own_posts += 1,
            Rejection::NoTimestamp => self.no_timestamp += 1,
            Rejection::TooOld => self.too_old += 1,
        }
    }
}

/// Context shared by all eligibility checks of one source scan.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub exclusions: &'a ExclusionSet,
    pub acting_did: &'a str,
    /// Items created before this instant are too old
    pub cutoff: DateTime<Utc>,
    pub source_tag: &'a str,
    /// Set by the source that produced the item, not by content
    pub promoted: bool,
}

/// Evaluate one raw item against the full predicate chain.
pub fn evaluate(item: &dyn RawItem, ctx: &BuildContext<'_>) -> Result<Candidate, Rejection> {
    if item.uri().is_empty() || item.cid().is_empty() {
        return Err(Rejection::Incomplete);
    }

    if item.repost_reason() {
        return Err(Rejection::Boost);
    }

    let record = item.record().ok_or(Rejection::Incomplete)?;

    if record.is_reply {
        return Err(Rejection::Reply);
    }

    match record.embed {
        Some(EmbedShape::Quote) | Some(EmbedShape::QuoteWithMedia) => {
            return Err(Rejection::Quote)
        }
        Some(EmbedShape::Images) | Some(EmbedShape::Video) => {}
        Some(EmbedShape::LinkCard) | Some(EmbedShape::Unknown) | None => {
            return Err(Rejection::NoMedia)
        }
    }

    let author = item.author();
    let handle = author.and_then(|a| a.handle.as_deref());
    let did = author.and_then(|a| a.did.as_deref());

    if ctx.exclusions.contains(handle, did) {
        return Err(Rejection::Excluded);
    }

    if did.is_some_and(|d| d.eq_ignore_ascii_case(ctx.acting_did)) {
        return Err(Rejection::OwnPost);
    }

    let created_at = parse_created_at(item).ok_or(Rejection::NoTimestamp)?;
    if created_at < ctx.cutoff {
        return Err(Rejection::TooOld);
    }

    let author_key = author
        .and_then(|a| a.key())
        .unwrap_or_else(|| item.uri().to_string());

    Ok(Candidate {
        subject_uri: item.uri().to_string(),
        subject_cid: item.cid().to_string(),
        author_key,
        created_at,
        source_tag: ctx.source_tag.to_string(),
        promoted: ctx.promoted,
    })
}

/// Probe timestamp fields in fixed priority order: the post view's
/// `indexed_at`, then the record's `created_at`. Malformed values are
/// skipped, not fatal; the first parse that succeeds wins.
pub fn parse_created_at(item: &dyn RawItem) -> Option<DateTime<Utc>> {
    let probes = [
        item.indexed_at(),
        item.record().and_then(|r| r.created_at.as_deref()),
    ];

    probes
        .into_iter()
        .flatten()
        .find_map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}
