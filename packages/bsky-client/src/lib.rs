//! Pure Bluesky XRPC REST client.
//!
//! A minimal client for the Bluesky AppView / PDS API. Supports session
//! login, feed and list reads, post search, and repo record writes
//! (repost/like create and delete).
//!
//! # Example
//!
//! ```rust,ignore
//! use bsky_client::BskyClient;
//!
//! let client = BskyClient::login("https://bsky.social", "alice.bsky.social", "app-password").await?;
//!
//! let page = client.get_feed("at://did:plc:abc/app.bsky.feed.generator/xyz", 100, None).await?;
//! for item in &page.feed {
//!     println!("{}", item.post.uri);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{BskyError, Result};
pub use types::{
    CreateRecordResponse, FeedResponse, FeedViewPost, ListItemView, ListRecordsResponse,
    ListResponse, PostRecord, PostView, ProfileViewBasic, RecordEmbed, RecordEntry,
    ResolveHandleResponse, SearchResponse, Session, StrongRef,
};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Default service endpoint for first-party accounts.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Record collection for reposts.
pub const REPOST_COLLECTION: &str = "app.bsky.feed.repost";

/// Record collection for likes.
pub const LIKE_COLLECTION: &str = "app.bsky.feed.like";

pub struct BskyClient {
    client: reqwest::Client,
    service: String,
    session: Session,
}

impl BskyClient {
    /// Create a session via `com.atproto.server.createSession`.
    pub async fn login(service: &str, identifier: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let url = format!("{}/xrpc/com.atproto.server.createSession", service);
        let resp = client
            .post(&url)
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BskyError::Auth("login rejected".into()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BskyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let session: Session = resp.json().await?;
        tracing::info!(did = %session.did, "Session established");

        Ok(Self {
            client,
            service: service.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// DID of the logged-in account.
    pub fn did(&self) -> &str {
        &self.session.did
    }

    async fn get_json<T: DeserializeOwned>(&self, nsid: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.service, nsid);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.session.access_jwt)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BskyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(&self, nsid: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.service, nsid);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.session.access_jwt)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BskyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch one page of a feed generator's output.
    pub async fn get_feed(
        &self,
        feed: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<FeedResponse> {
        let mut query = vec![("feed", feed.to_string()), ("limit", limit.to_string())];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }
        self.get_json("app.bsky.feed.getFeed", &query).await
    }

    /// Fetch an actor's own recent timeline.
    pub async fn get_author_feed(&self, actor: &str, limit: u32) -> Result<FeedResponse> {
        let query = vec![("actor", actor.to_string()), ("limit", limit.to_string())];
        self.get_json("app.bsky.feed.getAuthorFeed", &query).await
    }

    /// Fetch one page of list membership.
    pub async fn get_list(
        &self,
        list: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ListResponse> {
        let mut query = vec![("list", list.to_string()), ("limit", limit.to_string())];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }
        self.get_json("app.bsky.graph.getList", &query).await
    }

    /// Search recent posts, newest first.
    pub async fn search_posts(&self, q: &str, limit: u32) -> Result<SearchResponse> {
        let query = vec![
            ("q", q.to_string()),
            ("sort", "latest".to_string()),
            ("limit", limit.to_string()),
        ];
        self.get_json("app.bsky.feed.searchPosts", &query).await
    }

    /// Resolve a handle to a DID.
    pub async fn resolve_handle(&self, handle: &str) -> Result<String> {
        let query = vec![("handle", handle.to_string())];
        let resp: ResolveHandleResponse = self
            .get_json("com.atproto.identity.resolveHandle", &query)
            .await?;
        Ok(resp.did)
    }

    /// Create a repost or like record pointing at `subject`.
    pub async fn create_record(
        &self,
        collection: &str,
        subject: StrongRef,
    ) -> Result<CreateRecordResponse> {
        let body = json!({
            "repo": self.session.did,
            "collection": collection,
            "record": {
                "$type": collection,
                "subject": { "uri": subject.uri, "cid": subject.cid },
                "createdAt": Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            },
        });
        self.post_json("com.atproto.repo.createRecord", body).await
    }

    /// Delete an own record by collection and rkey.
    pub async fn delete_record(&self, collection: &str, rkey: &str) -> Result<()> {
        let url = format!("{}/xrpc/com.atproto.repo.deleteRecord", self.service);
        let body = json!({
            "repo": self.session.did,
            "collection": collection,
            "rkey": rkey,
        });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.session.access_jwt)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BskyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    /// List the account's own records in a collection (e.g. all reposts).
    pub async fn list_records(
        &self,
        collection: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ListRecordsResponse> {
        let mut query = vec![
            ("repo", self.session.did.clone()),
            ("collection", collection.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }
        self.get_json("com.atproto.repo.listRecords", &query).await
    }
}
