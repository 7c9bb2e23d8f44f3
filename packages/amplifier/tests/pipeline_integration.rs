//! Integration tests for the full amplification pipeline.
//!
//! Everything runs against the mock collaborator: no network, no real
//! account, instant sleeps, seeded randomness, state files in tempdirs.

use std::time::Duration;

use amplifier::item::EmbedShape;
use amplifier::testing::{feed_item, media_post, InstantSleeper, MockApi};
use amplifier::{
    run, ActionKind, PromotedSlot, RunConfig, SourceSpec, StateStore,
};

const FEED: &str = "at://did:plc:gen/app.bsky.feed.generator/main";

fn subject(n: u32) -> String {
    format!("at://did:plc:author/app.bsky.feed.post/{n}")
}

fn config(dir: &tempfile::TempDir) -> RunConfig {
    RunConfig::new()
        .with_source(SourceSpec::feed("main", FEED))
        .with_state_file(dir.path().join("state.json"))
        .with_inter_action_delay(Duration::from_secs(2))
}

async fn run_once(config: &RunConfig, api: &MockApi) -> amplifier::RunReport {
    let sleeper = InstantSleeper::new();
    let mut rng = fastrand::Rng::with_seed(7);
    run(config, api, &sleeper, &mut rng).await.unwrap()
}

#[tokio::test]
async fn per_author_cap_limits_one_author() {
    // 5 eligible candidates from one author, cap 2.
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir).with_per_author_cap(2);

    let items = (0..5)
        .map(|n| feed_item(media_post(&subject(n), "did:plc:author", 60 + n as i64)))
        .collect();
    let api = MockApi::new().with_feed(FEED, items);

    let report = run_once(&config, &api).await;

    assert_eq!(report.reposted, 2);
    assert_eq!(report.skipped_quota, 3);
    assert_eq!(api.creates(ActionKind::Repost).len(), 2);

    let store = StateStore::load(&config.state_file);
    assert_eq!(store.repost_count(), 2);
    for n in 0..5 {
        let has_like = store.like_uri(&subject(n)).is_some();
        let has_repost = store.repost_uri(&subject(n)).is_some();
        assert_eq!(has_like, has_repost);
    }
}

#[tokio::test]
async fn amplification_is_at_most_once_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let api = MockApi::new().with_feed(
        FEED,
        vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
    );

    let first = run_once(&config, &api).await;
    assert_eq!(first.reposted, 1);

    let second = run_once(&config, &api).await;
    assert_eq!(second.reposted, 0);
    assert_eq!(second.skipped_done, 1);

    // One repost create total, no deletes in between.
    assert_eq!(api.creates(ActionKind::Repost).len(), 1);
    assert!(api.deletes().is_empty());
}

#[tokio::test]
async fn promoted_subject_is_refreshed_with_delete_then_create() {
    // A promoted candidate already in the store gets its old
    // actions deleted before new ones are created.
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new()
        .with_source(SourceSpec::feed("promo", FEED).promoted())
        .with_state_file(dir.path().join("state.json"))
        .with_inter_action_delay(Duration::from_secs(2));

    let api = MockApi::new().with_feed(
        FEED,
        vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
    );

    run_once(&config, &api).await;
    let old_repost = StateStore::load(&config.state_file)
        .repost_uri(&subject(1))
        .unwrap()
        .to_string();

    let second = run_once(&config, &api).await;
    assert_eq!(second.reposted, 1);

    let deletes = api.deletes();
    assert!(deletes.contains(&old_repost), "old repost must be deleted");

    let store = StateStore::load(&config.state_file);
    let new_repost = store.repost_uri(&subject(1)).unwrap();
    assert_ne!(new_repost, old_repost, "store must hold the new identifier");
}

#[tokio::test]
async fn failed_repost_leaves_no_state_and_is_retried() {
    // Repost create fails; nothing recorded, next run retries.
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let items = vec![feed_item(media_post(&subject(1), "did:plc:author", 30))];

    let failing = MockApi::new()
        .with_feed(FEED, items.clone())
        .with_repost_failure(subject(1));
    let report = run_once(&config, &failing).await;
    assert_eq!(report.reposted, 0);
    assert_eq!(report.failed, 1);
    // No like was even attempted.
    assert!(failing.creates(ActionKind::Like).is_empty());

    let store = StateStore::load(&config.state_file);
    assert!(store.repost_uri(&subject(1)).is_none());
    assert!(store.like_uri(&subject(1)).is_none());

    let healthy = MockApi::new().with_feed(FEED, items);
    let retry = run_once(&config, &healthy).await;
    assert_eq!(retry.reposted, 1);
}

#[tokio::test]
async fn link_card_only_posts_never_reach_scheduling() {
    // A post whose only embed is a link preview is rejected.
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let mut post = media_post(&subject(1), "did:plc:author", 30);
    post.record.as_mut().unwrap().embed = Some(EmbedShape::LinkCard);
    let api = MockApi::new().with_feed(FEED, vec![feed_item(post)]);

    let report = run_once(&config, &api).await;
    assert_eq!(report.candidates, 0);
    assert!(api.creates(ActionKind::Repost).is_empty());
}

#[tokio::test]
async fn like_failure_keeps_the_repost_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let api = MockApi::new()
        .with_feed(
            FEED,
            vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
        )
        .with_like_failure(subject(1));

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 1);
    assert_eq!(report.liked, 0);

    let store = StateStore::load(&config.state_file);
    assert!(store.repost_uri(&subject(1)).is_some());
    assert!(store.like_uri(&subject(1)).is_none());
}

#[tokio::test]
async fn older_candidates_are_scheduled_first() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let api = MockApi::new().with_feed(
        FEED,
        vec![
            feed_item(media_post(&subject(1), "did:plc:a", 10)),
            feed_item(media_post(&subject(2), "did:plc:b", 120)),
            feed_item(media_post(&subject(3), "did:plc:c", 60)),
        ],
    );

    run_once(&config, &api).await;

    let order = api.creates(ActionKind::Repost);
    assert_eq!(order, vec![subject(2), subject(3), subject(1)]);
}

#[tokio::test]
async fn duplicate_subjects_across_sources_are_amplified_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir).with_source(SourceSpec::search("tag", "#promo"));

    let api = MockApi::new()
        .with_feed(
            FEED,
            vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
        )
        .with_search("#promo", vec![media_post(&subject(1), "did:plc:author", 30)]);

    let report = run_once(&config, &api).await;
    assert_eq!(report.candidates, 1);
    assert_eq!(api.creates(ActionKind::Repost).len(), 1);
}

#[tokio::test]
async fn failing_source_contributes_zero_candidates_without_failing_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let broken = "at://did:plc:gen/app.bsky.feed.generator/broken";
    let config = config(&dir).with_source(SourceSpec::feed("broken", broken));

    let api = MockApi::new()
        .with_feed(
            FEED,
            vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
        )
        .with_feed_failure(broken);

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 1);
}

#[tokio::test]
async fn fatal_create_error_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let api = MockApi::new()
        .with_feed(
            FEED,
            vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
        )
        .with_fatal_creates("authentication expired");

    let sleeper = InstantSleeper::new();
    let mut rng = fastrand::Rng::with_seed(7);
    let result = run(&config, &api, &sleeper, &mut rng).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn run_cap_stops_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir).with_run_cap(2);
    let items = (0..5)
        .map(|n| feed_item(media_post(&subject(n), &format!("did:plc:a{n}"), 30 + n as i64)))
        .collect();
    let api = MockApi::new().with_feed(FEED, items);

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 2);
    assert_eq!(api.creates(ActionKind::Repost).len(), 2);
}

#[tokio::test]
async fn delay_is_imposed_after_each_successful_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let api = MockApi::new().with_feed(
        FEED,
        vec![
            feed_item(media_post(&subject(1), "did:plc:a", 30)),
            feed_item(media_post(&subject(2), "did:plc:b", 60)),
        ],
    );

    let sleeper = InstantSleeper::new();
    let mut rng = fastrand::Rng::with_seed(7);
    run(&config, &api, &sleeper, &mut rng).await.unwrap();

    assert_eq!(sleeper.pauses(), vec![Duration::from_secs(2); 2]);
}

#[tokio::test]
async fn corrupt_state_file_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    std::fs::write(&config.state_file, "][ not json").unwrap();

    let api = MockApi::new().with_feed(
        FEED,
        vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
    );

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 1);

    // The rewritten file is valid again.
    let store = StateStore::load(&config.state_file);
    assert!(store.repost_uri(&subject(1)).is_some());
}

#[tokio::test]
async fn pinned_post_slot_forces_refresh_from_a_general_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir).with_promoted_slot(PromotedSlot::Post {
        subject_uri: subject(1),
    });

    let api = MockApi::new().with_feed(
        FEED,
        vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
    );

    run_once(&config, &api).await;
    let old_repost = StateStore::load(&config.state_file)
        .repost_uri(&subject(1))
        .unwrap()
        .to_string();

    // Second run: the slot bypasses the skip-if-done rule and refreshes.
    let second = run_once(&config, &api).await;
    assert_eq!(second.reposted, 1);
    assert!(api.deletes().contains(&old_repost));
}

#[tokio::test]
async fn list_source_expands_members_and_search_source_needs_no_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let list = "at://did:plc:gen/app.bsky.graph.list/members";
    let config = RunConfig::new()
        .with_source(SourceSpec::list("group", list))
        .with_source(SourceSpec::search("tag", "#promo"))
        .with_state_file(dir.path().join("state.json"));

    let api = MockApi::new()
        .with_list(
            list,
            vec![amplifier::ActorRef::new("did:plc:member", "member.bsky.social")],
        )
        .with_timeline(
            "did:plc:member",
            vec![feed_item(media_post(&subject(1), "did:plc:member", 30))],
        )
        .with_search("#promo", vec![media_post(&subject(2), "did:plc:other", 45)]);

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 2);
}

#[tokio::test]
async fn feed_pagination_follows_cursors_and_truncates_at_the_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.feed_item_ceiling = 3;

    let pages = (0..3)
        .map(|p| {
            (0..2)
                .map(|n| {
                    let id = p * 2 + n;
                    feed_item(media_post(&subject(id), &format!("did:plc:a{id}"), 30 + id as i64))
                })
                .collect()
        })
        .collect();
    let api = MockApi::new().with_feed_pages(FEED, pages);

    let report = run_once(&config, &api).await;

    // Two items per page: the second page tips over the ceiling, the
    // third is never requested, and the overshoot is truncated.
    assert_eq!(report.candidates, 3);
    assert_eq!(report.reposted, 3);
    let feed_fetches = api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, amplifier::testing::ApiCall::FeedPage { .. }))
        .count();
    assert_eq!(feed_fetches, 2);
}

#[tokio::test]
async fn low_member_ceiling_still_walks_every_list_member() {
    let dir = tempfile::tempdir().unwrap();
    let list = "at://did:plc:gen/app.bsky.graph.list/members";
    let mut config = RunConfig::new()
        .with_source(SourceSpec::list("group", list))
        .with_state_file(dir.path().join("state.json"));
    config.member_ceiling = 1;

    let api = MockApi::new()
        .with_list(
            list,
            vec![
                amplifier::ActorRef::new("did:plc:m1", "m1.bsky.social"),
                amplifier::ActorRef::new("did:plc:m2", "m2.bsky.social"),
            ],
        )
        .with_timeline(
            "did:plc:m1",
            vec![feed_item(media_post(&subject(1), "did:plc:m1", 30))],
        )
        .with_timeline(
            "did:plc:m2",
            vec![feed_item(media_post(&subject(2), "did:plc:m2", 45))],
        );

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 2);
}

#[tokio::test]
async fn failed_compensating_delete_still_refreshes_the_promoted_subject() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::new()
        .with_source(SourceSpec::feed("promo", FEED).promoted())
        .with_state_file(dir.path().join("state.json"));

    let api = MockApi::new().with_feed(
        FEED,
        vec![feed_item(media_post(&subject(1), "did:plc:author", 30))],
    );

    run_once(&config, &api).await;
    let old_repost = StateStore::load(&config.state_file)
        .repost_uri(&subject(1))
        .unwrap()
        .to_string();

    let api = api.with_delete_failure(old_repost.clone());
    let second = run_once(&config, &api).await;

    // The delete was attempted and rejected; the stale entry is cleared
    // anyway and the re-create proceeds.
    assert!(api.deletes().contains(&old_repost));
    assert_eq!(second.reposted, 1);

    let store = StateStore::load(&config.state_file);
    assert_ne!(store.repost_uri(&subject(1)).unwrap(), old_repost);
}

#[tokio::test]
async fn excluded_list_members_are_never_amplified() {
    let dir = tempfile::tempdir().unwrap();
    let excl = "at://did:plc:gen/app.bsky.graph.list/blocked";
    let config = config(&dir).with_exclusion_list(excl);

    let api = MockApi::new()
        .with_list(
            excl,
            vec![amplifier::ActorRef::new("did:plc:author", "author.bsky.social")],
        )
        .with_feed(
            FEED,
            vec![
                feed_item(media_post(&subject(1), "did:plc:author", 30)),
                feed_item(media_post(&subject(2), "did:plc:fine", 60)),
            ],
        );

    let report = run_once(&config, &api).await;
    assert_eq!(report.reposted, 1);
    assert_eq!(api.creates(ActionKind::Repost), vec![subject(2)]);
}
