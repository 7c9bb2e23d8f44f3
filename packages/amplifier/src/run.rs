//! Run orchestration: one full amplification pass, leaf to root.

use chrono::Utc;
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::executor;
use crate::merge::merge_and_dedup;
use crate::quota;
use crate::sources;
use crate::state::StateStore;
use crate::traits::{AmplifyApi, Sleeper};
use crate::types::RunReport;

/// Execute one amplification run.
///
/// Loads the persisted state, builds the exclusion set, scans all
/// sources (each failing independently), merges and deduplicates,
/// schedules the two quota lanes, executes actions, and persists the
/// state. Individual source and action failures are logged and absorbed;
/// only fatal collaborator errors make the run fail.
pub async fn run(
    config: &RunConfig,
    api: &dyn AmplifyApi,
    sleeper: &dyn Sleeper,
    rng: &mut fastrand::Rng,
) -> Result<RunReport> {
    let mut store = StateStore::load(&config.state_file);
    let now = Utc::now();

    let exclusions = sources::load_exclusions(api, config).await?;
    if !exclusions.is_empty() {
        info!(excluded = exclusions.len(), "Exclusion set loaded");
    }

    let raw = sources::collect_all(api, config, &exclusions, now).await?;
    let candidates = merge_and_dedup(raw);
    info!(candidates = candidates.len(), "Candidates after merge and dedup");

    let order = quota::plan(candidates, &config.promoted_slots, rng);
    let report = executor::execute(order, api, &mut store, sleeper, config).await?;

    store.save(&config.state_file)?;

    info!(
        reposted = report.reposted,
        liked = report.liked,
        skipped_quota = report.skipped_quota,
        skipped_done = report.skipped_done,
        failed = report.failed,
        "Run complete"
    );

    Ok(report)
}
