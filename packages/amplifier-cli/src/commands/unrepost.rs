//! The `unrepost-all` and `unrepost-batch` subcommands.
//!
//! Maintenance tools that walk the account's own repost records and
//! delete them, for cleaning up after an over-eager configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use bsky_client::{BskyClient, REPOST_COLLECTION};

const PAGE_LIMIT: u32 = 100;

/// Delete own repost records, up to `max_actions`. In dry-run mode the
/// records are only listed.
pub async fn unrepost_all(
    client: &BskyClient,
    dry_run: bool,
    max_actions: u32,
    sleep: Duration,
) -> Result<()> {
    info!(dry_run, max_actions, "Scanning own repost records");

    let mut cursor: Option<String> = None;
    let mut scanned = 0u32;
    let mut deleted = 0u32;

    loop {
        let page = client
            .list_records(REPOST_COLLECTION, PAGE_LIMIT, cursor.as_deref())
            .await
            .context("Failed to list repost records")?;

        if page.records.is_empty() {
            break;
        }

        for record in &page.records {
            scanned += 1;
            let Some(parsed) = amplifier::uri::parse_at_uri(&record.uri) else {
                continue;
            };
            if parsed.did != client.did() || parsed.collection != REPOST_COLLECTION {
                continue;
            }

            info!(uri = %record.uri, "Unrepost");
            if !dry_run {
                if let Err(e) = client.delete_record(REPOST_COLLECTION, parsed.rkey).await {
                    warn!(uri = %record.uri, error = %e, "Delete failed, continuing");
                    continue;
                }
            }

            deleted += 1;
            if deleted >= max_actions {
                info!(scanned, deleted, "Max actions reached, stopping");
                return Ok(());
            }
            tokio::time::sleep(sleep).await;
        }

        cursor = page.cursor;
        if cursor.is_none() {
            break;
        }
    }

    info!(scanned, deleted, "Unrepost scan complete");
    if dry_run {
        info!("Dry run: nothing was deleted");
    }
    Ok(())
}

/// Count remaining repost records, then delete up to `max_actions`.
pub async fn unrepost_batch(client: &BskyClient, max_actions: u32, sleep: Duration) -> Result<()> {
    let remaining = count_reposts(client).await?;
    info!(remaining, "Remaining repost records");

    if remaining == 0 {
        info!("Nothing to do");
        return Ok(());
    }

    unrepost_all(client, false, max_actions, sleep).await
}

async fn count_reposts(client: &BskyClient) -> Result<u32> {
    let mut cursor: Option<String> = None;
    let mut total = 0u32;

    loop {
        let page = client
            .list_records(REPOST_COLLECTION, PAGE_LIMIT, cursor.as_deref())
            .await
            .context("Failed to list repost records")?;
        if page.records.is_empty() {
            break;
        }
        total += page.records.len() as u32;
        cursor = page.cursor;
        if cursor.is_none() {
            break;
        }
    }

    Ok(total)
}
