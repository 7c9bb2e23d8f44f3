//! Core data types for a single amplification run.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// A post that survived eligibility filtering and may be amplified.
///
/// Candidates live for one run only; only confirmed actions are
/// persisted (in the state store), never the candidates themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Global unique key for dedup (AT-URI of the subject post)
    pub subject_uri: String,
    /// Content hash of the subject, required by create calls
    pub subject_cid: String,
    /// Quota key: author DID, handle fallback, subject URI last resort
    pub author_key: String,
    pub created_at: DateTime<Utc>,
    /// Which configured source produced this candidate
    pub source_tag: String,
    /// Promoted candidates bypass the per-author cap and force-refresh
    pub promoted: bool,
}

/// Confirmed action identifiers for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRecord {
    pub repost_uri: Option<String>,
    pub like_uri: Option<String>,
}

/// Authors that must never be amplified, from one or more member lists.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    handles: HashSet<String>,
    dids: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; empty handle/DID values are ignored.
    pub fn insert(&mut self, handle: Option<&str>, did: Option<&str>) {
        if let Some(h) = handle.filter(|h| !h.is_empty()) {
            self.handles.insert(h.to_ascii_lowercase());
        }
        if let Some(d) = did.filter(|d| !d.is_empty()) {
            self.dids.insert(d.to_ascii_lowercase());
        }
    }

    pub fn contains(&self, handle: Option<&str>, did: Option<&str>) -> bool {
        handle.is_some_and(|h| self.handles.contains(&h.to_ascii_lowercase()))
            || did.is_some_and(|d| self.dids.contains(&d.to_ascii_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.handles.len().max(self.dids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.dids.is_empty()
    }
}

/// Transient per-run quota counters.
#[derive(Debug, Clone, Default)]
pub struct QuotaState {
    per_author: HashMap<String, u32>,
    total_this_run: u32,
}

impl QuotaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.total_this_run
    }

    pub fn run_cap_reached(&self, run_cap: u32) -> bool {
        self.total_this_run >= run_cap
    }

    pub fn author_cap_reached(&self, author_key: &str, per_author_cap: u32) -> bool {
        self.per_author
            .get(author_key)
            .is_some_and(|&n| n >= per_author_cap)
    }

    /// Record one confirmed action. Promoted candidates consume global
    /// quota but never per-author quota.
    pub fn record(&mut self, author_key: &str, promoted: bool) {
        self.total_this_run += 1;
        if !promoted {
            *self.per_author.entry(author_key.to_string()).or_insert(0) += 1;
        }
    }
}

/// Per-run outcome counters, logged at the end of each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub candidates: usize,
    pub reposted: u32,
    pub liked: u32,
    /// Candidates skipped because a quota was exhausted
    pub skipped_quota: u32,
    /// Candidates skipped because a prior run already amplified them
    pub skipped_done: u32,
    /// Candidates whose repost call failed
    pub failed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_set_is_case_insensitive() {
        let mut set = ExclusionSet::new();
        set.insert(Some("Spammer.bsky.social"), Some("did:plc:ABC"));

        assert!(set.contains(Some("spammer.bsky.social"), None));
        assert!(set.contains(None, Some("did:plc:abc")));
        assert!(!set.contains(Some("other.bsky.social"), Some("did:plc:xyz")));
    }

    #[test]
    fn promoted_actions_skip_per_author_counter() {
        let mut quota = QuotaState::new();
        quota.record("did:plc:a", true);
        quota.record("did:plc:a", true);

        assert_eq!(quota.total(), 2);
        assert!(!quota.author_cap_reached("did:plc:a", 1));

        quota.record("did:plc:a", false);
        assert!(quota.author_cap_reached("did:plc:a", 1));
    }
}
