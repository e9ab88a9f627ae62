use std::sync::Arc;

use tracing::{debug, error, info, warn};

use storage::repository::CheckedStateRepository;
use study_core::model::{CheckedState, Curriculum, ObjectiveId, Progress};
use study_core::{Checklist, NodeKey, ToggleOutcome};

/// Owns the checklist state and persists every change.
///
/// Until `load` completes, queries answer with empty defaults and mutations
/// are ignored.
pub struct ChecklistService {
    repo: Arc<dyn CheckedStateRepository>,
    checklist: Option<Checklist>,
}

impl ChecklistService {
    #[must_use]
    pub fn new(repo: Arc<dyn CheckedStateRepository>) -> Self {
        Self {
            repo,
            checklist: None,
        }
    }

    /// Pair `curriculum` with the stored checked-state.
    ///
    /// A missing or unreadable snapshot starts the checklist empty.
    pub async fn load(&mut self, curriculum: Arc<Curriculum>) {
        let state = match self.repo.load_checked_state().await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "discarding unreadable checklist state");
                CheckedState::default()
            }
        };
        info!(
            leaves = curriculum.leaf_count(),
            checked = state.iter().filter(|(_, checked)| *checked).count(),
            "checklist loaded"
        );
        self.checklist = Some(Checklist::new(curriculum, state));
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.checklist.is_some()
    }

    #[must_use]
    pub fn checklist(&self) -> Option<&Checklist> {
        self.checklist.as_ref()
    }

    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.checklist.as_ref().is_some_and(|c| c.is_checked(id))
    }

    #[must_use]
    pub fn progress(&self, key: &NodeKey) -> Progress {
        self.checklist
            .as_ref()
            .map(|c| c.progress_of(key))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn overall_progress(&self) -> Progress {
        self.checklist
            .as_ref()
            .map(Checklist::overall_progress)
            .unwrap_or_default()
    }

    /// Flip a leaf and persist the new mapping.
    ///
    /// Returns `None` before the checklist is loaded.
    pub async fn toggle(&mut self, id: &ObjectiveId) -> Option<ToggleOutcome> {
        let checklist = self.checklist.as_mut()?;
        let outcome = checklist.toggle(id);
        debug!(id = %outcome.id, checked = outcome.checked, "checklist toggled");
        self.persist().await;
        Some(outcome)
    }

    /// Set a leaf explicitly; unchanged values are not written again.
    pub async fn set_checked(&mut self, id: &ObjectiveId, checked: bool) -> Option<ToggleOutcome> {
        let checklist = self.checklist.as_mut()?;
        let was = checklist.is_checked(id.as_str());
        let outcome = checklist.set_checked(id, checked);
        if was != checked {
            self.persist().await;
        }
        Some(outcome)
    }

    /// Aggregates of the nodes an outcome marked stale.
    #[must_use]
    pub fn refreshed(&self, outcome: &ToggleOutcome) -> Vec<(NodeKey, Progress)> {
        self.checklist
            .as_ref()
            .map(|c| c.refreshed(outcome))
            .unwrap_or_default()
    }

    // Write failures keep the in-memory change.
    async fn persist(&self) {
        let Some(checklist) = self.checklist.as_ref() else {
            return;
        };
        if let Err(err) = self.repo.save_checked_state(checklist.state()).await {
            error!(error = %err, "failed to persist checklist state");
        }
    }
}
