//! Merging and deduplication of candidates from all sources.

use std::collections::HashSet;

use crate::types::Candidate;

/// Stable-sort all candidates ascending by creation time (oldest first,
/// so recent bursts cannot starve older eligible content) and drop
/// duplicate subjects, keeping the earliest-sorted occurrence.
pub fn merge_and_dedup(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by_key(|c| c.created_at);

    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates.retain(|c| seen.insert(c.subject_uri.clone()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn candidate(uri: &str, minutes_ago: i64, source: &str) -> Candidate {
        Candidate {
            subject_uri: uri.to_string(),
            subject_cid: "cid".to_string(),
            author_key: "did:plc:a".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            source_tag: source.to_string(),
            promoted: false,
        }
    }

    #[test]
    fn sorts_oldest_first() {
        let merged = merge_and_dedup(vec![
            candidate("at://p/1", 5, "feed"),
            candidate("at://p/2", 60, "feed"),
            candidate("at://p/3", 30, "search"),
        ]);

        let uris: Vec<&str> = merged.iter().map(|c| c.subject_uri.as_str()).collect();
        assert_eq!(uris, ["at://p/2", "at://p/3", "at://p/1"]);
    }

    #[test]
    fn dedup_keeps_earliest_occurrence() {
        let merged = merge_and_dedup(vec![
            candidate("at://p/1", 5, "feed"),
            candidate("at://p/1", 60, "search"),
        ]);

        assert_eq!(merged.len(), 1);
        // The 60-minutes-ago copy sorts first and is the one kept.
        assert_eq!(merged[0].source_tag, "search");
    }
}
