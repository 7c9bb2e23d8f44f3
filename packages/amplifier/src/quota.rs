//! Quota scheduling: lane assembly and cap decisions.
//!
//! The scheduler walks candidates in two lanes, promoted lane first.
//! Promoted entries are only capped by the global run cap; general-lane
//! entries additionally respect the per-author cap. Author caps skip a
//! candidate without consuming global quota; the run cap stops the walk
//! entirely.

use crate::config::PromotedSlot;
use crate::types::{Candidate, QuotaState};

/// Outcome of a quota check for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Schedule this candidate
    Proceed,
    /// Per-author cap exhausted: skip, keep walking
    SkipAuthor,
    /// Run cap exhausted: stop the walk
    StopRun,
}

pub fn check(
    quota: &QuotaState,
    candidate: &Candidate,
    run_cap: u32,
    per_author_cap: u32,
) -> QuotaDecision {
    if quota.run_cap_reached(run_cap) {
        return QuotaDecision::StopRun;
    }
    if !candidate.promoted && quota.author_cap_reached(&candidate.author_key, per_author_cap) {
        return QuotaDecision::SkipAuthor;
    }
    QuotaDecision::Proceed
}

/// Assemble the execution order from deduplicated, time-ordered
/// candidates: apply designated promoted slots, then emit the promoted
/// lane followed by the general lane, each internally oldest-first.
///
/// Author slots draw uniformly from that author's eligible candidates
/// through the injected RNG; seed it for deterministic tests.
pub fn plan(
    mut candidates: Vec<Candidate>,
    slots: &[PromotedSlot],
    rng: &mut fastrand::Rng,
) -> Vec<Candidate> {
    for slot in slots {
        match slot {
            PromotedSlot::Post { subject_uri } => {
                if let Some(c) = candidates.iter_mut().find(|c| c.subject_uri == *subject_uri) {
                    c.promoted = true;
                } else {
                    tracing::debug!(subject = %subject_uri, "Pinned post not among eligible candidates this run");
                }
            }
            PromotedSlot::Author { author_key } => {
                let indices: Vec<usize> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.promoted && c.author_key == *author_key)
                    .map(|(i, _)| i)
                    .collect();
                if indices.is_empty() {
                    tracing::debug!(author = %author_key, "No eligible candidates for promoted author slot");
                    continue;
                }
                let pick = indices[rng.usize(0..indices.len())];
                candidates[pick].promoted = true;
            }
        }
    }

    let (promoted, general): (Vec<Candidate>, Vec<Candidate>) =
        candidates.into_iter().partition(|c| c.promoted);

    let mut order = promoted;
    order.extend(general);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn candidate(uri: &str, author: &str, minutes_ago: i64, promoted: bool) -> Candidate {
        Candidate {
            subject_uri: uri.to_string(),
            subject_cid: "cid".to_string(),
            author_key: author.to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            source_tag: "test".to_string(),
            promoted,
        }
    }

    #[test]
    fn promoted_lane_runs_before_general_lane() {
        let mut rng = fastrand::Rng::with_seed(1);
        let order = plan(
            vec![
                candidate("at://p/1", "a", 90, false),
                candidate("at://p/2", "b", 30, true),
                candidate("at://p/3", "c", 60, false),
            ],
            &[],
            &mut rng,
        );

        let uris: Vec<&str> = order.iter().map(|c| c.subject_uri.as_str()).collect();
        assert_eq!(uris, ["at://p/2", "at://p/1", "at://p/3"]);
    }

    #[test]
    fn pinned_post_slot_promotes_matching_candidate() {
        let mut rng = fastrand::Rng::with_seed(1);
        let order = plan(
            vec![
                candidate("at://p/1", "a", 90, false),
                candidate("at://p/2", "b", 30, false),
            ],
            &[PromotedSlot::Post {
                subject_uri: "at://p/2".to_string(),
            }],
            &mut rng,
        );

        assert_eq!(order[0].subject_uri, "at://p/2");
        assert!(order[0].promoted);
        assert!(!order[1].promoted);
    }

    #[test]
    fn author_slot_pick_is_deterministic_under_a_seed() {
        let candidates = || {
            vec![
                candidate("at://p/1", "a", 90, false),
                candidate("at://p/2", "a", 60, false),
                candidate("at://p/3", "a", 30, false),
            ]
        };
        let slot = [PromotedSlot::Author {
            author_key: "a".to_string(),
        }];

        let mut rng = fastrand::Rng::with_seed(42);
        let first = plan(candidates(), &slot, &mut rng);
        let mut rng = fastrand::Rng::with_seed(42);
        let second = plan(candidates(), &slot, &mut rng);

        assert_eq!(first[0].subject_uri, second[0].subject_uri);
        assert!(first[0].promoted);
        assert_eq!(first.iter().filter(|c| c.promoted).count(), 1);
    }

    #[test]
    fn author_cap_skips_without_consuming_global_quota() {
        let mut quota = QuotaState::new();
        quota.record("a", false);
        quota.record("a", false);

        let c = candidate("at://p/9", "a", 5, false);
        assert_eq!(check(&quota, &c, 100, 2), QuotaDecision::SkipAuthor);

        let other = candidate("at://p/10", "b", 5, false);
        assert_eq!(check(&quota, &other, 100, 2), QuotaDecision::Proceed);
    }

    #[test]
    fn run_cap_stops_even_promoted_candidates() {
        let mut quota = QuotaState::new();
        quota.record("a", false);

        let promoted = candidate("at://p/1", "b", 5, true);
        assert_eq!(check(&quota, &promoted, 1, 3), QuotaDecision::StopRun);
    }
}
