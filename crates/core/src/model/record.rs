use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ItemId, ObjectiveId};

/// Persisted checklist state: leaf id to checked flag.
///
/// Keys are opaque. Ids that do not exist in the curriculum are kept so the
/// snapshot written back is exactly what was loaded plus local edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckedState(BTreeMap<ObjectiveId, bool>);

impl CheckedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing keys read as unchecked.
    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: ObjectiveId, checked: bool) {
        self.0.insert(id, checked);
    }

    /// Flip the flag for `id` and return the new value.
    pub fn toggle(&mut self, id: &ObjectiveId) -> bool {
        let next = !self.is_checked(id.as_str());
        self.0.insert(id.clone(), next);
        next
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectiveId, bool)> {
        self.0.iter().map(|(id, checked)| (id, *checked))
    }
}

impl FromIterator<(ObjectiveId, bool)> for CheckedState {
    fn from_iter<I: IntoIterator<Item = (ObjectiveId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Persisted revision progress, kept apart from the checklist state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed: Vec<ItemId>,
    #[serde(default)]
    pub needs_review: Vec<ItemId>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}
