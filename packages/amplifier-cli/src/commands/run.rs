//! The `run` subcommand: one full amplification pass.

use anyhow::{Context, Result};

use amplifier::TokioSleeper;
use bsky_client::BskyClient;

use crate::adapter::BskyApi;
use crate::config::AppConfig;

pub async fn execute(config: &AppConfig, client: BskyClient) -> Result<()> {
    if config.run.sources.is_empty() {
        tracing::warn!("No sources configured (FEEDS/LISTS/SEARCH_QUERY), nothing to do");
        return Ok(());
    }

    let api = BskyApi::new(client);
    let mut rng = fastrand::Rng::new();

    let report = amplifier::run(&config.run, &api, &TokioSleeper, &mut rng)
        .await
        .context("Amplification run failed")?;

    tracing::info!(
        reposted = report.reposted,
        liked = report.liked,
        "Done"
    );
    Ok(())
}
