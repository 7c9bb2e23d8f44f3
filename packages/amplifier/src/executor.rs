//! Action executor: the idempotent amplify state machine.
//!
//! Walks the scheduled order one candidate at a time, strictly
//! sequentially. Only confirmed creates are written to the state store,
//! so killing the process mid-run is always safe: unconfirmed subjects
//! are re-evaluated on the next run.

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::quota::{self, QuotaDecision};
use crate::state::StateStore;
use crate::traits::{ActionKind, AmplifyApi, Sleeper};
use crate::types::{Candidate, QuotaState, RunReport};
use crate::uri::parse_at_uri;

/// Execute the scheduled candidates in order.
///
/// Per candidate: quota check, skip-if-done (non-promoted),
/// force-refresh (promoted), repost create, like create, delay. Repost
/// failure aborts only that candidate; like failure is logged and the
/// repost stays recorded. Only fatal collaborator errors propagate.
pub async fn execute(
    order: Vec<Candidate>,
    api: &dyn AmplifyApi,
    store: &mut StateStore,
    sleeper: &dyn Sleeper,
    config: &RunConfig,
) -> Result<RunReport> {
    let mut quota = QuotaState::new();
    let mut report = RunReport {
        candidates: order.len(),
        ..RunReport::default()
    };

    for candidate in order {
        match quota::check(&quota, &candidate, config.run_cap, config.per_author_cap) {
            QuotaDecision::StopRun => {
                info!(total = quota.total(), "Run cap reached, stopping");
                break;
            }
            QuotaDecision::SkipAuthor => {
                report.skipped_quota += 1;
                continue;
            }
            QuotaDecision::Proceed => {}
        }

        if candidate.promoted {
            // Promoted subjects are re-created with a fresh timestamp so
            // they bump back to the top of followers' timelines.
            force_refresh(api, store, &candidate.subject_uri).await;
        } else if store.repost_uri(&candidate.subject_uri).is_some() {
            report.skipped_done += 1;
            continue;
        }

        let repost_uri = match api
            .create_action(ActionKind::Repost, &candidate.subject_uri, &candidate.subject_cid)
            .await
        {
            Ok(uri) => uri,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(subject = %candidate.subject_uri, error = %e, "Repost failed, skipping candidate");
                report.failed += 1;
                continue;
            }
        };

        store.set_repost(&candidate.subject_uri, &repost_uri);
        quota.record(&candidate.author_key, candidate.promoted);
        report.reposted += 1;
        info!(subject = %candidate.subject_uri, source = %candidate.source_tag, "Reposted");

        match api
            .create_action(ActionKind::Like, &candidate.subject_uri, &candidate.subject_cid)
            .await
        {
            Ok(like_uri) => {
                store.set_like(&candidate.subject_uri, &like_uri);
                report.liked += 1;
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                // A repost without a like is a valid terminal state.
                warn!(subject = %candidate.subject_uri, error = %e, "Like failed");
            }
        }

        sleeper.sleep(config.inter_action_delay).await;
    }

    Ok(report)
}

/// Best-effort compensating deletes for a promoted subject's existing
/// actions. The local entries are cleared regardless of delete outcome
/// so the subsequent create always proceeds.
async fn force_refresh(api: &dyn AmplifyApi, store: &mut StateStore, subject_uri: &str) {
    for kind in [ActionKind::Repost, ActionKind::Like] {
        let existing = match kind {
            ActionKind::Repost => store.repost_uri(subject_uri),
            ActionKind::Like => store.like_uri(subject_uri),
        };
        let Some(action_uri) = existing.map(str::to_string) else {
            continue;
        };

        if owned_action(&action_uri, api.acting_did(), kind) {
            match api.delete_action(&action_uri).await {
                Ok(()) => info!(subject = %subject_uri, %kind, "Removed prior action for refresh"),
                Err(e) => {
                    warn!(subject = %subject_uri, %kind, error = %e, "Compensating delete failed")
                }
            }
        } else {
            warn!(subject = %subject_uri, action = %action_uri, "Recorded action is not ours, not deleting");
        }

        match kind {
            ActionKind::Repost => store.clear_repost(subject_uri),
            ActionKind::Like => store.clear_like(subject_uri),
        }
    }
}

/// A delete is only issued for records the acting account owns, in the
/// collection the action kind expects.
fn owned_action(action_uri: &str, acting_did: &str, kind: ActionKind) -> bool {
    parse_at_uri(action_uri)
        .is_some_and(|at| at.did == acting_did && at.collection == kind.collection())
}
