//! Candidate aggregation, quota scheduling, and idempotent amplification.
//!
//! Pulls eligible posts from configured sources (feeds, member lists,
//! keyword search), filters them against media/content/exclusion rules,
//! applies global and per-author quotas, and performs repost + like
//! actions exactly once per subject across runs, backed by a durable
//! state file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use amplifier::{run, RunConfig, SourceSpec, TokioSleeper};
//!
//! let config = RunConfig::new()
//!     .with_source(SourceSpec::feed("promo", "at://did:plc:abc/app.bsky.feed.generator/xyz").promoted())
//!     .with_source(SourceSpec::search("hashtag", "#bskypromo"));
//!
//! let mut rng = fastrand::Rng::new();
//! let report = run(&config, &api, &TokioSleeper, &mut rng).await?;
//! println!("{} reposts, {} likes", report.reposted, report.liked);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams ([`AmplifyApi`], [`Sleeper`])
//! - [`item`] - Raw item abstraction over source payloads
//! - [`sources`] - Feed, list-member and search connectors
//! - [`builder`] - Eligibility predicates
//! - [`merge`] / [`quota`] - Ordering, dedup, and the two quota lanes
//! - [`executor`] - The idempotent action state machine
//! - [`state`] - Durable subject-to-action store
//! - [`testing`] - Mock collaborator for tests

pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod item;
pub mod merge;
pub mod quota;
pub mod run;
pub mod sources;
pub mod state;
pub mod testing;
pub mod traits;
pub mod types;
pub mod uri;

// Re-exports for clean API
pub use config::{PromotedSlot, RunConfig, SourceKind, SourceSpec};
pub use error::{AmplifyError, ApiError, ApiResult, ErrorKind, Result, StateError};
pub use item::{ActorRef, EmbedShape, FeedItem, PostItem, RawItem, RecordView};
pub use run::run;
pub use state::StateStore;
pub use traits::{ActionKind, AmplifyApi, Page, Sleeper, TokioSleeper};
pub use types::{ActionRecord, Candidate, ExclusionSet, QuotaState, RunReport};
