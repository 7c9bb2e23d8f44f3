//! Testing utilities including mock implementations.
//!
//! Useful for exercising the pipeline without a network or a real
//! account. The mock collaborator records every call so tests can
//! assert exactly which actions were attempted.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;

use crate::error::{ApiError, ApiResult};
use crate::item::{ActorRef, EmbedShape, FeedItem, PostItem, RecordView};
use crate::traits::{ActionKind, AmplifyApi, Page, Sleeper};

/// Record of a call made to the mock collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    FeedPage { feed: String, cursor: Option<String> },
    ListPage { list: String, cursor: Option<String> },
    Timeline { actor: String },
    Search { query: String },
    Create { kind: ActionKind, subject_uri: String },
    Delete { action_uri: String },
    Resolve { handle: String },
}

/// A mock collaborator API with configurable content and failures.
#[derive(Default)]
pub struct MockApi {
    acting_did: String,

    /// Feed pages keyed by feed URI, served in order
    feed_pages: RwLock<HashMap<String, Vec<Vec<FeedItem>>>>,
    /// List member pages keyed by list URI, served in order
    list_pages: RwLock<HashMap<String, Vec<Vec<ActorRef>>>>,
    /// Member timelines keyed by actor
    timelines: RwLock<HashMap<String, Vec<FeedItem>>>,
    /// Search results keyed by query
    searches: RwLock<HashMap<String, Vec<PostItem>>>,
    /// Handle resolutions
    handles: RwLock<HashMap<String, String>>,

    /// Subjects whose repost create fails (transient)
    fail_repost: RwLock<HashSet<String>>,
    /// Subjects whose like create fails (transient)
    fail_like: RwLock<HashSet<String>>,
    /// Action URIs whose delete fails (transient)
    fail_delete: RwLock<HashSet<String>>,
    /// When set, every create fails fatally with this message
    fatal_create: RwLock<Option<String>>,
    /// Feeds whose fetch fails (transient)
    fail_feed: RwLock<HashSet<String>>,

    next_rkey: AtomicU64,
    calls: Arc<RwLock<Vec<ApiCall>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            acting_did: "did:plc:me".to_string(),
            ..Default::default()
        }
    }

    pub fn with_did(mut self, did: impl Into<String>) -> Self {
        self.acting_did = did.into();
        self
    }

    /// Serve a single-page feed.
    pub fn with_feed(self, feed: impl Into<String>, items: Vec<FeedItem>) -> Self {
        self.feed_pages.write().unwrap().insert(feed.into(), vec![items]);
        self
    }

    /// Serve a multi-page feed; pages are chained by synthetic cursors.
    pub fn with_feed_pages(self, feed: impl Into<String>, pages: Vec<Vec<FeedItem>>) -> Self {
        self.feed_pages.write().unwrap().insert(feed.into(), pages);
        self
    }

    pub fn with_list(self, list: impl Into<String>, members: Vec<ActorRef>) -> Self {
        self.list_pages.write().unwrap().insert(list.into(), vec![members]);
        self
    }

    pub fn with_timeline(self, actor: impl Into<String>, items: Vec<FeedItem>) -> Self {
        self.timelines.write().unwrap().insert(actor.into(), items);
        self
    }

    pub fn with_search(self, query: impl Into<String>, posts: Vec<PostItem>) -> Self {
        self.searches.write().unwrap().insert(query.into(), posts);
        self
    }

    pub fn with_handle(self, handle: impl Into<String>, did: impl Into<String>) -> Self {
        self.handles.write().unwrap().insert(handle.into(), did.into());
        self
    }

    pub fn with_repost_failure(self, subject_uri: impl Into<String>) -> Self {
        self.fail_repost.write().unwrap().insert(subject_uri.into());
        self
    }

    pub fn with_like_failure(self, subject_uri: impl Into<String>) -> Self {
        self.fail_like.write().unwrap().insert(subject_uri.into());
        self
    }

    pub fn with_delete_failure(self, action_uri: impl Into<String>) -> Self {
        self.fail_delete.write().unwrap().insert(action_uri.into());
        self
    }

    pub fn with_fatal_creates(self, message: impl Into<String>) -> Self {
        *self.fatal_create.write().unwrap() = Some(message.into());
        self
    }

    pub fn with_feed_failure(self, feed: impl Into<String>) -> Self {
        self.fail_feed.write().unwrap().insert(feed.into());
        self
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Create calls of one kind, in order.
    pub fn creates(&self, kind: ActionKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Create { kind: k, subject_uri } if k == kind => Some(subject_uri),
                _ => None,
            })
            .collect()
    }

    /// Delete calls, in order.
    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Delete { action_uri } => Some(action_uri),
                _ => None,
            })
            .collect()
    }

    fn track(&self, call: ApiCall) {
        self.calls.write().unwrap().push(call);
    }

    fn page_of<T: Clone>(pages: &[Vec<T>], cursor: Option<&str>) -> Page<T> {
        let index: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let items = pages.get(index).cloned().unwrap_or_default();
        let cursor = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Page { items, cursor }
    }
}

#[async_trait]
impl AmplifyApi for MockApi {
    fn acting_did(&self) -> &str {
        &self.acting_did
    }

    async fn fetch_feed_page(&self, feed: &str, cursor: Option<&str>) -> ApiResult<Page<FeedItem>> {
        self.track(ApiCall::FeedPage {
            feed: feed.to_string(),
            cursor: cursor.map(str::to_string),
        });
        if self.fail_feed.read().unwrap().contains(feed) {
            return Err(ApiError::transient(format!("feed unavailable: {feed}")));
        }
        let pages = self.feed_pages.read().unwrap();
        Ok(Self::page_of(pages.get(feed).map(Vec::as_slice).unwrap_or(&[]), cursor))
    }

    async fn fetch_list_page(&self, list: &str, cursor: Option<&str>) -> ApiResult<Page<ActorRef>> {
        self.track(ApiCall::ListPage {
            list: list.to_string(),
            cursor: cursor.map(str::to_string),
        });
        let pages = self.list_pages.read().unwrap();
        Ok(Self::page_of(pages.get(list).map(Vec::as_slice).unwrap_or(&[]), cursor))
    }

    async fn fetch_member_timeline(&self, actor: &str, _limit: u32) -> ApiResult<Vec<FeedItem>> {
        self.track(ApiCall::Timeline {
            actor: actor.to_string(),
        });
        Ok(self
            .timelines
            .read()
            .unwrap()
            .get(actor)
            .cloned()
            .unwrap_or_default())
    }

    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<PostItem>> {
        self.track(ApiCall::Search {
            query: query.to_string(),
        });
        let mut posts = self
            .searches
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn create_action(
        &self,
        kind: ActionKind,
        subject_uri: &str,
        _subject_cid: &str,
    ) -> ApiResult<String> {
        self.track(ApiCall::Create {
            kind,
            subject_uri: subject_uri.to_string(),
        });

        if let Some(message) = self.fatal_create.read().unwrap().as_ref() {
            return Err(ApiError::fatal(message.clone()));
        }
        let failures = match kind {
            ActionKind::Repost => &self.fail_repost,
            ActionKind::Like => &self.fail_like,
        };
        if failures.read().unwrap().contains(subject_uri) {
            return Err(ApiError::transient(format!("{kind} rejected upstream")));
        }

        let rkey = self.next_rkey.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "at://{}/{}/{}",
            self.acting_did,
            kind.collection(),
            rkey
        ))
    }

    async fn delete_action(&self, action_uri: &str) -> ApiResult<()> {
        self.track(ApiCall::Delete {
            action_uri: action_uri.to_string(),
        });
        if self.fail_delete.read().unwrap().contains(action_uri) {
            return Err(ApiError::transient("delete rejected upstream"));
        }
        Ok(())
    }

    async fn resolve_handle(&self, handle: &str) -> ApiResult<String> {
        self.track(ApiCall::Resolve {
            handle: handle.to_string(),
        });
        self.handles
            .read()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| ApiError::rejected(format!("unknown handle: {handle}")))
    }
}

/// Sleeper that never sleeps but records every requested pause.
#[derive(Default)]
pub struct InstantSleeper {
    pauses: Arc<RwLock<Vec<Duration>>>,
}

impl InstantSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.read().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.write().unwrap().push(duration);
    }
}

/// Build an eligible media post for tests.
pub fn media_post(uri: &str, author_did: &str, minutes_ago: i64) -> PostItem {
    PostItem {
        uri: uri.to_string(),
        cid: format!("cid-{}", uri.rsplit('/').next().unwrap_or("x")),
        author: Some(ActorRef {
            did: Some(author_did.to_string()),
            handle: None,
        }),
        indexed_at: None,
        record: Some(RecordView {
            created_at: Some((Utc::now() - chrono::Duration::minutes(minutes_ago)).to_rfc3339()),
            is_reply: false,
            embed: Some(EmbedShape::Images),
        }),
    }
}

/// Wrap a post in a non-boosted feed item.
pub fn feed_item(post: PostItem) -> FeedItem {
    FeedItem {
        post,
        boosted: false,
    }
}
