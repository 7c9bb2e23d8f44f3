//! Run configuration value object.
//!
//! Built once at startup (the CLI reads it from the environment) and
//! passed down; nothing in the pipeline reads ambient configuration.

use chrono::Duration;

/// What a configured source points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A feed generator, paginated by cursor
    Feed { reference: String },
    /// A member list, expanded to per-member timelines
    List { reference: String },
    /// A bounded keyword search
    Search { query: String },
}

/// One configured content source.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Short label used in logs and candidate records
    pub tag: String,
    pub kind: SourceKind,
    /// Candidates from promoted sources enter the promoted lane
    pub promoted: bool,
}

impl SourceSpec {
    pub fn feed(tag: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            kind: SourceKind::Feed {
                reference: reference.into(),
            },
            promoted: false,
        }
    }

    pub fn list(tag: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            kind: SourceKind::List {
                reference: reference.into(),
            },
            promoted: false,
        }
    }

    pub fn search(tag: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            kind: SourceKind::Search {
                query: query.into(),
            },
            promoted: false,
        }
    }

    pub fn promoted(mut self) -> Self {
        self.promoted = true;
        self
    }
}

/// A designated promoted slot, always scheduled when eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotedSlot {
    /// Pin one specific post by subject URI
    Post { subject_uri: String },
    /// Pick one random eligible post of this author per run
    Author { author_key: String },
}

/// Full configuration for one amplification run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sources: Vec<SourceSpec>,
    /// Lists whose members must never be amplified
    pub exclusion_lists: Vec<String>,
    pub promoted_slots: Vec<PromotedSlot>,

    /// Candidates older than now - window are rejected
    pub recency_window: Duration,
    /// Max total actions per run
    pub run_cap: u32,
    /// Max non-promoted actions per author per run
    pub per_author_cap: u32,
    /// Pause after each successfully scheduled candidate
    pub inter_action_delay: std::time::Duration,

    /// Max list members walked per list, content and exclusion alike
    /// (floored at 1000, see [`RunConfig::effective_member_ceiling`])
    pub member_ceiling: u32,
    /// Max timeline items pulled per expanded member
    pub per_member_ceiling: u32,
    /// Max items pulled from a feed source
    pub feed_item_ceiling: u32,
    /// Max items pulled from a search source
    pub search_item_ceiling: u32,

    /// Path of the persisted action state file
    pub state_file: std::path::PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            exclusion_lists: Vec::new(),
            promoted_slots: Vec::new(),
            recency_window: Duration::hours(3),
            run_cap: 100,
            per_author_cap: 3,
            inter_action_delay: std::time::Duration::from_secs(2),
            member_ceiling: 1500,
            per_member_ceiling: 10,
            feed_item_ceiling: 500,
            search_item_ceiling: 100,
            state_file: "amplify_state.json".into(),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: SourceSpec) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_exclusion_list(mut self, reference: impl Into<String>) -> Self {
        self.exclusion_lists.push(reference.into());
        self
    }

    pub fn with_promoted_slot(mut self, slot: PromotedSlot) -> Self {
        self.promoted_slots.push(slot);
        self
    }

    pub fn with_recency_window(mut self, window: Duration) -> Self {
        self.recency_window = window;
        self
    }

    pub fn with_run_cap(mut self, cap: u32) -> Self {
        self.run_cap = cap;
        self
    }

    pub fn with_per_author_cap(mut self, cap: u32) -> Self {
        self.per_author_cap = cap;
        self
    }

    pub fn with_inter_action_delay(mut self, delay: std::time::Duration) -> Self {
        self.inter_action_delay = delay;
        self
    }

    pub fn with_state_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Every list walk (content expansion and exclusion loading) covers
    /// at least 1000 members, so a low configured ceiling cannot
    /// silently drop members.
    pub fn effective_member_ceiling(&self) -> u32 {
        self.member_ceiling.max(1000)
    }
}
