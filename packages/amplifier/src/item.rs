//! Raw item abstraction over source payloads.
//!
//! Connectors hand the candidate builder values implementing [`RawItem`],
//! which exposes the capabilities eligibility rules care about as named
//! optional accessors instead of ad hoc shape probing. Feed items carry a
//! boost marker; bare post views (search results) never do.

/// An author reference as carried by post and list payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorRef {
    pub did: Option<String>,
    pub handle: Option<String>,
}

impl ActorRef {
    pub fn new(did: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            did: Some(did.into()),
            handle: Some(handle.into()),
        }
    }

    /// Stable identifier for fetches and quota keys: DID preferred,
    /// handle as fallback.
    pub fn key(&self) -> Option<String> {
        self.did
            .as_deref()
            .or(self.handle.as_deref())
            .map(|s| s.to_ascii_lowercase())
    }
}

/// The shape of a record's embed, reduced to what eligibility needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedShape {
    /// One or more attached images
    Images,
    /// An attached video
    Video,
    /// External link card only
    LinkCard,
    /// Quotes another record, no extra media
    Quote,
    /// Quotes another record with attached media
    QuoteWithMedia,
    /// Embed type this version does not recognize
    Unknown,
}

/// The underlying post record, reduced to eligibility-relevant fields.
#[derive(Debug, Clone, Default)]
pub struct RecordView {
    pub created_at: Option<String>,
    pub is_reply: bool,
    pub embed: Option<EmbedShape>,
}

/// A post as delivered by any source.
#[derive(Debug, Clone)]
pub struct PostItem {
    pub uri: String,
    pub cid: String,
    pub author: Option<ActorRef>,
    pub indexed_at: Option<String>,
    pub record: Option<RecordView>,
}

/// A feed entry: a post plus whether it entered the feed as a boost.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub post: PostItem,
    pub boosted: bool,
}

/// Named optional capabilities of a raw source item.
pub trait RawItem {
    fn uri(&self) -> &str;
    fn cid(&self) -> &str;
    fn author(&self) -> Option<&ActorRef>;
    fn record(&self) -> Option<&RecordView>;
    fn indexed_at(&self) -> Option<&str>;

    /// True when the item is itself a repost/boost of something else.
    fn repost_reason(&self) -> bool;

    fn embed(&self) -> Option<EmbedShape> {
        self.record().and_then(|r| r.embed)
    }
}

impl RawItem for PostItem {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn cid(&self) -> &str {
        &self.cid
    }

    fn author(&self) -> Option<&ActorRef> {
        self.author.as_ref()
    }

    fn record(&self) -> Option<&RecordView> {
        self.record.as_ref()
    }

    fn indexed_at(&self) -> Option<&str> {
        self.indexed_at.as_deref()
    }

    fn repost_reason(&self) -> bool {
        false
    }
}

impl RawItem for FeedItem {
    fn uri(&self) -> &str {
        &self.post.uri
    }

    fn cid(&self) -> &str {
        &self.post.cid
    }

    fn author(&self) -> Option<&ActorRef> {
        self.post.author.as_ref()
    }

    fn record(&self) -> Option<&RecordView> {
        self.post.record.as_ref()
    }

    fn indexed_at(&self) -> Option<&str> {
        self.post.indexed_at.as_deref()
    }

    fn repost_reason(&self) -> bool {
        self.boosted
    }
}
