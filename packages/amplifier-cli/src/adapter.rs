//! Adapter binding the Bluesky XRPC client to the pipeline's API seam.
//!
//! Converts wire payloads into the core's raw item types and classifies
//! transport failures into the pipeline's error taxonomy.

use async_trait::async_trait;

use amplifier::item::{ActorRef, EmbedShape, FeedItem, PostItem, RecordView};
use amplifier::uri::parse_at_uri;
use amplifier::{ActionKind, AmplifyApi, ApiError, ApiResult, Page};
use bsky_client::{BskyClient, BskyError, FeedViewPost, PostView, RecordEmbed, StrongRef};

/// Page size used for all cursor-paginated reads.
const PAGE_LIMIT: u32 = 100;

pub struct BskyApi {
    client: BskyClient,
}

impl BskyApi {
    pub fn new(client: BskyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AmplifyApi for BskyApi {
    fn acting_did(&self) -> &str {
        self.client.did()
    }

    async fn fetch_feed_page(&self, feed: &str, cursor: Option<&str>) -> ApiResult<Page<FeedItem>> {
        let resp = self
            .client
            .get_feed(feed, PAGE_LIMIT, cursor)
            .await
            .map_err(classify)?;
        Ok(Page {
            items: resp.feed.into_iter().map(convert_feed_item).collect(),
            cursor: resp.cursor,
        })
    }

    async fn fetch_list_page(&self, list: &str, cursor: Option<&str>) -> ApiResult<Page<ActorRef>> {
        let resp = self
            .client
            .get_list(list, PAGE_LIMIT, cursor)
            .await
            .map_err(classify)?;
        let items = resp
            .items
            .into_iter()
            .filter_map(|item| item.subject)
            .map(|subject| ActorRef {
                did: subject.did,
                handle: subject.handle,
            })
            .collect();
        Ok(Page {
            items,
            cursor: resp.cursor,
        })
    }

    async fn fetch_member_timeline(&self, actor: &str, limit: u32) -> ApiResult<Vec<FeedItem>> {
        let resp = self
            .client
            .get_author_feed(actor, limit)
            .await
            .map_err(classify)?;
        Ok(resp.feed.into_iter().map(convert_feed_item).collect())
    }

    async fn search(&self, query: &str, limit: u32) -> ApiResult<Vec<PostItem>> {
        let resp = self
            .client
            .search_posts(query, limit)
            .await
            .map_err(classify)?;
        Ok(resp.posts.into_iter().map(convert_post).collect())
    }

    async fn create_action(
        &self,
        kind: ActionKind,
        subject_uri: &str,
        subject_cid: &str,
    ) -> ApiResult<String> {
        let resp = self
            .client
            .create_record(
                kind.collection(),
                StrongRef {
                    uri: subject_uri.to_string(),
                    cid: subject_cid.to_string(),
                },
            )
            .await
            .map_err(classify)?;
        Ok(resp.uri)
    }

    async fn delete_action(&self, action_uri: &str) -> ApiResult<()> {
        let parsed = parse_at_uri(action_uri)
            .ok_or_else(|| ApiError::rejected(format!("not an AT-URI: {action_uri}")))?;
        self.client
            .delete_record(parsed.collection, parsed.rkey)
            .await
            .map_err(classify)
    }

    async fn resolve_handle(&self, handle: &str) -> ApiResult<String> {
        self.client.resolve_handle(handle).await.map_err(classify)
    }
}

/// Map a transport error into the pipeline's taxonomy: auth failures
/// are fatal, rate limits and 4xx are policy rejections, everything
/// else is transient and safe to retry next run.
fn classify(error: BskyError) -> ApiError {
    match &error {
        BskyError::Auth(_) => ApiError::fatal(error.to_string()),
        BskyError::Api { status, .. } => match status {
            401 | 403 => ApiError::fatal(error.to_string()),
            400..=499 => ApiError::rejected(error.to_string()),
            _ => ApiError::transient(error.to_string()),
        },
        BskyError::Http(_) => ApiError::transient(error.to_string()),
    }
}

fn convert_feed_item(item: FeedViewPost) -> FeedItem {
    FeedItem {
        boosted: item.reason.is_some(),
        post: convert_post(item.post),
    }
}

fn convert_post(post: PostView) -> PostItem {
    PostItem {
        uri: post.uri,
        cid: post.cid,
        author: post.author.map(|a| ActorRef {
            did: a.did,
            handle: a.handle,
        }),
        indexed_at: post.indexed_at,
        record: post.record.map(|r| RecordView {
            created_at: r.created_at,
            is_reply: r.reply.is_some(),
            embed: r.embed.map(convert_embed),
        }),
    }
}

fn convert_embed(embed: RecordEmbed) -> EmbedShape {
    match embed {
        RecordEmbed::Images { .. } => EmbedShape::Images,
        RecordEmbed::Video { .. } => EmbedShape::Video,
        RecordEmbed::External { .. } => EmbedShape::LinkCard,
        RecordEmbed::Record { .. } => EmbedShape::Quote,
        RecordEmbed::RecordWithMedia { .. } => EmbedShape::QuoteWithMedia,
        RecordEmbed::Other => EmbedShape::Unknown,
    }
}
