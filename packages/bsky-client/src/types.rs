use serde::{Deserialize, Serialize};

/// Session data from `com.atproto.server.createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub handle: String,
    pub did: String,
}

/// Minimal author view attached to posts and list items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileViewBasic {
    pub did: Option<String>,
    pub handle: Option<String>,
}

/// A hydrated post view (`app.bsky.feed.defs#postView`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    pub author: Option<ProfileViewBasic>,
    pub record: Option<PostRecord>,
    pub indexed_at: Option<String>,
}

/// The underlying `app.bsky.feed.post` record of a post view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub created_at: Option<String>,
    pub reply: Option<serde_json::Value>,
    pub embed: Option<RecordEmbed>,
}

/// Embed union inside a post record, discriminated by `$type`.
///
/// Only the shape matters to callers (images/video vs. link card vs.
/// quoted record); inner payloads are not inspected further.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "$type")]
pub enum RecordEmbed {
    #[serde(rename = "app.bsky.embed.images")]
    Images { images: Vec<serde_json::Value> },
    #[serde(rename = "app.bsky.embed.video")]
    Video { video: serde_json::Value },
    #[serde(rename = "app.bsky.embed.external")]
    External { external: serde_json::Value },
    #[serde(rename = "app.bsky.embed.record")]
    Record { record: serde_json::Value },
    #[serde(rename = "app.bsky.embed.recordWithMedia")]
    RecordWithMedia {
        record: serde_json::Value,
        media: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// An item in a feed response: a post plus an optional repost reason.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
    /// Present when the item appears in the feed because someone boosted it.
    pub reason: Option<serde_json::Value>,
}

/// Response of `app.bsky.feed.getFeed` / `getAuthorFeed`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub feed: Vec<FeedViewPost>,
    pub cursor: Option<String>,
}

/// A list membership entry (`app.bsky.graph.defs#listItemView`).
#[derive(Debug, Clone, Deserialize)]
pub struct ListItemView {
    pub subject: Option<ProfileViewBasic>,
}

/// Response of `app.bsky.graph.getList`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<ListItemView>,
    pub cursor: Option<String>,
}

/// Response of `app.bsky.feed.searchPosts`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub posts: Vec<PostView>,
    pub cursor: Option<String>,
}

/// Strong reference to a record (`com.atproto.repo.strongRef`).
#[derive(Debug, Clone, Serialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// Response of `com.atproto.repo.createRecord`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}

/// A stored record as returned by `com.atproto.repo.listRecords`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEntry {
    pub uri: String,
    pub cid: String,
}

/// Response of `com.atproto.repo.listRecords`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<RecordEntry>,
    pub cursor: Option<String>,
}

/// Response of `com.atproto.identity.resolveHandle`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveHandleResponse {
    pub did: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_embed_discriminates_on_type() {
        let images: RecordEmbed =
            serde_json::from_str(r#"{"$type":"app.bsky.embed.images","images":[{}]}"#).unwrap();
        assert!(matches!(images, RecordEmbed::Images { .. }));

        let external: RecordEmbed = serde_json::from_str(
            r#"{"$type":"app.bsky.embed.external","external":{"uri":"https://example.com"}}"#,
        )
        .unwrap();
        assert!(matches!(external, RecordEmbed::External { .. }));

        let unknown: RecordEmbed =
            serde_json::from_str(r#"{"$type":"app.bsky.embed.futureThing"}"#).unwrap();
        assert!(matches!(unknown, RecordEmbed::Other));
    }

    #[test]
    fn feed_response_tolerates_missing_feed_key() {
        let resp: FeedResponse = serde_json::from_str(r#"{"cursor":"abc"}"#).unwrap();
        assert!(resp.feed.is_empty());
        assert_eq!(resp.cursor.as_deref(), Some("abc"));
    }
}
