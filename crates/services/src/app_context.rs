use std::sync::Arc;

use storage::repository::Storage;
use study_core::model::Curriculum;
use study_core::{Clock, DateRange};

use crate::checklist_service::ChecklistService;
use crate::config::AppConfig;
use crate::error::AppContextError;
use crate::revision_service::RevisionService;
use crate::source::{CurriculumOrigin, CurriculumSource, load_or_fallback};

/// Owns the loaded curriculum and both feature services. Front-ends borrow
/// read-only views from it and route mutations through it.
pub struct AppContext {
    clock: Clock,
    curriculum: Arc<Curriculum>,
    origin: CurriculumOrigin,
    checklist: ChecklistService,
    revision: RevisionService,
}

impl AppContext {
    /// Build a context backed by `SQLite` storage and the configured source.
    ///
    /// # Errors
    ///
    /// Returns `AppContextError` if the database cannot be opened or the
    /// configured dates are inverted. Curriculum problems never fail; the
    /// built-in sample is used instead.
    pub async fn bootstrap(config: &AppConfig, clock: Clock) -> Result<Self, AppContextError> {
        let range = config.date_range()?;
        let storage = Storage::sqlite(&config.database_url).await?;
        let source = config.curriculum_source();
        Ok(Self::assemble(storage, source.as_ref(), range, clock).await)
    }

    /// Build a context from already-constructed parts.
    pub async fn assemble(
        storage: Storage,
        source: &dyn CurriculumSource,
        range: DateRange,
        clock: Clock,
    ) -> Self {
        let loaded = load_or_fallback(source).await;

        let mut checklist = ChecklistService::new(Arc::clone(&storage.checked));
        checklist.load(Arc::clone(&loaded.curriculum)).await;

        let mut revision =
            RevisionService::new(range, Arc::clone(&storage.progress)).with_clock(clock);
        revision.load(&loaded.curriculum).await;

        Self {
            clock,
            curriculum: loaded.curriculum,
            origin: loaded.origin,
            checklist,
            revision,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    #[must_use]
    pub fn origin(&self) -> &CurriculumOrigin {
        &self.origin
    }

    #[must_use]
    pub fn checklist(&self) -> &ChecklistService {
        &self.checklist
    }

    pub fn checklist_mut(&mut self) -> &mut ChecklistService {
        &mut self.checklist
    }

    #[must_use]
    pub fn revision(&self) -> &RevisionService {
        &self.revision
    }

    pub fn revision_mut(&mut self) -> &mut RevisionService {
        &mut self.revision
    }
}
