//! AT-URI parsing and source reference normalization.
//!
//! Sources may be configured either as `at://` URIs or as bsky.app web
//! URLs (`https://bsky.app/profile/<actor>/feed/<rkey>`); web URLs are
//! normalized here, resolving handles to DIDs through the collaborator.

use crate::error::ApiResult;
use crate::traits::AmplifyApi;

/// The components of an `at://did/collection/rkey` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri<'a> {
    pub did: &'a str,
    pub collection: &'a str,
    pub rkey: &'a str,
}

/// Parse an AT-URI into its repo/collection/rkey parts.
pub fn parse_at_uri(uri: &str) -> Option<AtUri<'_>> {
    let rest = uri.strip_prefix("at://")?;
    let mut parts = rest.splitn(3, '/');
    let did = parts.next()?;
    let collection = parts.next()?;
    let rkey = parts.next()?;
    if did.is_empty() || collection.is_empty() || rkey.is_empty() {
        return None;
    }
    Some(AtUri {
        did,
        collection,
        rkey,
    })
}

/// Normalize a feed reference to an `at://.../app.bsky.feed.generator/...` URI.
pub async fn normalize_feed_ref(api: &dyn AmplifyApi, reference: &str) -> ApiResult<Option<String>> {
    normalize_ref(api, reference, "feed", "app.bsky.feed.generator").await
}

/// Normalize a list reference to an `at://.../app.bsky.graph.list/...` URI.
pub async fn normalize_list_ref(api: &dyn AmplifyApi, reference: &str) -> ApiResult<Option<String>> {
    normalize_ref(api, reference, "lists", "app.bsky.graph.list").await
}

async fn normalize_ref(
    api: &dyn AmplifyApi,
    reference: &str,
    web_segment: &str,
    collection: &str,
) -> ApiResult<Option<String>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Ok(None);
    }

    if reference.starts_with("at://") {
        if reference.contains(&format!("/{}/", collection)) {
            return Ok(Some(reference.to_string()));
        }
        return Ok(None);
    }

    let Some((actor, rkey)) = parse_web_url(reference, web_segment) else {
        return Ok(None);
    };

    let did = if actor.starts_with("did:") {
        actor
    } else {
        api.resolve_handle(&actor).await?
    };

    Ok(Some(format!("at://{}/{}/{}", did, collection, rkey)))
}

/// Extract (actor, rkey) from `https://bsky.app/profile/<actor>/<segment>/<rkey>`.
fn parse_web_url(reference: &str, segment: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(reference).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?;
    if host != "bsky.app" && host != "www.bsky.app" {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["profile", actor, seg, rkey] if *seg == segment => {
            Some((actor.to_string(), rkey.to_string()))
        }
        _ => None,
    }
}
