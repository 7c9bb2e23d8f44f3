//! Trait seams toward external collaborators.
//!
//! The pipeline only ever talks to the social-graph service through
//! [`AmplifyApi`] and pauses through [`Sleeper`], so the whole core can
//! be exercised against mocks (see [`crate::testing`]).

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ApiResult;
use crate::item::{ActorRef, FeedItem, PostItem};

/// One page of a cursor-paginated response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }
}

/// Kind of amplification action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Repost,
    Like,
}

impl ActionKind {
    /// Record collection the action lives in.
    pub fn collection(self) -> &'static str {
        match self {
            ActionKind::Repost => "app.bsky.feed.repost",
            ActionKind::Like => "app.bsky.feed.like",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Repost => write!(f, "repost"),
            ActionKind::Like => write!(f, "like"),
        }
    }
}

/// Collaborator API surface consumed by the pipeline.
#[async_trait]
pub trait AmplifyApi: Send + Sync {
    /// DID of the acting account.
    fn acting_did(&self) -> &str;

    /// Fetch one page of a feed generator's output.
    async fn fetch_feed_page(
        &self,
        feed: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Page<FeedItem>>;

    /// Fetch one page of list membership.
    async fn fetch_list_page(
        &self,
        list: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Page<ActorRef>>;

    /// Fetch up to `limit` recent timeline items of one member.
    async fn fetch_member_timeline(&self, actor: &str, limit: u32) -> ApiResult<Vec<FeedItem>>;

    /// One bounded keyword search, newest first.
    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<PostItem>>;

    /// Create an amplification action; returns the action's own URI.
    async fn create_action(
        &self,
        kind: ActionKind,
        subject_uri: &str,
        subject_cid: &str,
    ) -> ApiResult<String>;

    /// Delete a previously created action by its URI.
    async fn delete_action(&self, action_uri: &str) -> ApiResult<()>;

    /// Resolve a handle to a DID (used for source URL normalization).
    async fn resolve_handle(&self, handle: &str) -> ApiResult<String>;
}

/// Seam for the fixed inter-action delay, mockable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
