//! Durable action state, the only entity with cross-run lifetime.
//!
//! Serialized as two top-level maps (`repost_records`, `like_records`)
//! keyed by subject URI, each value the action's own URI. Absent keys
//! load as empty maps; an unparsable file degrades to an empty store
//! with a loud warning instead of failing the run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StateError;
use crate::types::ActionRecord;

/// Persisted mapping of subject URI to confirmed action identifiers.
///
/// Invariant: an entry exists if and only if the collaborator confirmed
/// the corresponding create call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateStore {
    #[serde(default)]
    repost_records: BTreeMap<String, String>,
    #[serde(default)]
    like_records: BTreeMap<String, String>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from disk. A missing file is an empty store; an
    /// unparsable file is treated as empty after a warning, so a bad
    /// deploy never wedges the bot (at the cost of possible re-actions).
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No state file yet, starting empty");
                return Self::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read state file, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "State file is unparsable, starting empty; previously recorded actions may repeat"
                );
                Self::new()
            }
        }
    }

    /// Persist the store: write to `<path>.tmp`, then atomically rename,
    /// so a crash mid-write cannot corrupt the previously valid state.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let tmp = path.with_extension("tmp");
        let encoded = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn repost_uri(&self, subject_uri: &str) -> Option<&str> {
        self.repost_records.get(subject_uri).map(String::as_str)
    }

    pub fn like_uri(&self, subject_uri: &str) -> Option<&str> {
        self.like_records.get(subject_uri).map(String::as_str)
    }

    pub fn record(&self, subject_uri: &str) -> ActionRecord {
        ActionRecord {
            repost_uri: self.repost_records.get(subject_uri).cloned(),
            like_uri: self.like_records.get(subject_uri).cloned(),
        }
    }

    pub fn set_repost(&mut self, subject_uri: &str, action_uri: &str) {
        self.repost_records
            .insert(subject_uri.to_string(), action_uri.to_string());
    }

    pub fn set_like(&mut self, subject_uri: &str, action_uri: &str) {
        self.like_records
            .insert(subject_uri.to_string(), action_uri.to_string());
    }

    pub fn clear_repost(&mut self, subject_uri: &str) {
        self.repost_records.remove(subject_uri);
    }

    pub fn clear_like(&mut self, subject_uri: &str) {
        self.like_records.remove(subject_uri);
    }

    pub fn repost_count(&self) -> usize {
        self.repost_records.len()
    }
}
