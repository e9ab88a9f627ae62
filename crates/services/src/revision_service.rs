use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use storage::repository::ProgressRecordRepository;
use study_core::model::{Curriculum, ProgressRecord};
use study_core::schedule::{apply_record, flatten};
use study_core::{Clock, DateRange, DayPlan, ItemFilter, ProgressStats, RevisionItem, RevisionSchedule};

/// Owns the revision schedule, keeps its statistics current and persists the
/// completion record after every mark.
pub struct RevisionService {
    clock: Clock,
    range: DateRange,
    repo: Arc<dyn ProgressRecordRepository>,
    schedule: Option<RevisionSchedule>,
    stats: ProgressStats,
}

impl RevisionService {
    #[must_use]
    pub fn new(range: DateRange, repo: Arc<dyn ProgressRecordRepository>) -> Self {
        Self {
            clock: Clock::default_clock(),
            range,
            repo,
            schedule: None,
            stats: ProgressStats::default(),
        }
    }

    /// Override the clock (useful for deterministic tests).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the clock; statistics follow on the next `refresh` or mark.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Flatten `curriculum`, restore stored completion flags and lay the
    /// items out over the date range.
    pub async fn load(&mut self, curriculum: &Curriculum) {
        let mut items = flatten(curriculum);
        match self.repo.load_progress().await {
            Ok(Some(record)) => apply_record(&mut items, &record),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "discarding unreadable progress record"),
        }
        let schedule = RevisionSchedule::distribute(items, self.range);
        info!(
            items = schedule.items().len(),
            days = self.range.len(),
            per_day = schedule.per_day(),
            "revision schedule built"
        );
        self.stats = schedule.stats(self.clock.today());
        self.schedule = Some(schedule);
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.schedule.is_some()
    }

    #[must_use]
    pub fn schedule(&self) -> Option<&RevisionSchedule> {
        self.schedule.as_ref()
    }

    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Statistics as of the last load, mark or refresh.
    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        self.stats
    }

    /// Recompute statistics against the current day; called when the day
    /// rolls over.
    pub fn refresh(&mut self) -> ProgressStats {
        if let Some(schedule) = &self.schedule {
            self.stats = schedule.stats(self.clock.today());
        }
        self.stats
    }

    /// The plan for the clock's current day.
    #[must_use]
    pub fn today_plan(&self) -> DayPlan<'_> {
        self.day(self.clock.today())
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> DayPlan<'_> {
        match &self.schedule {
            Some(schedule) => schedule.day(date),
            None => DayPlan {
                date,
                items: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn items_on_key(&self, key: &str) -> Vec<&RevisionItem> {
        self.schedule
            .as_ref()
            .map(|s| s.items_on_key(key))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn week(&self, date: NaiveDate) -> Vec<DayPlan<'_>> {
        self.schedule
            .as_ref()
            .map(|s| s.week_overview(date))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.schedule
            .as_ref()
            .map(|s| s.dates().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn days_remaining(&self) -> i64 {
        self.schedule
            .as_ref()
            .map_or(0, |s| s.days_remaining(self.clock.today()))
    }

    /// Index of today on the timeline, clamped to the range.
    #[must_use]
    pub fn timeline_position(&self) -> usize {
        self.schedule
            .as_ref()
            .map_or(0, |s| s.timeline_position(self.clock.today()))
    }

    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&RevisionItem> {
        self.schedule
            .as_ref()
            .map(|s| s.search(query))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn filter(&self, filter: &ItemFilter) -> Vec<&RevisionItem> {
        self.schedule
            .as_ref()
            .map(|s| s.filter(filter))
            .unwrap_or_default()
    }

    /// Mark one item completed. Returns the updated statistics, or `None`
    /// when the id is unknown (nothing is written then).
    pub async fn mark_completed(&mut self, id: &str) -> Option<ProgressStats> {
        let schedule = self.schedule.as_mut()?;
        if !schedule.mark_completed(id) {
            debug!(id, "ignoring completion of unknown item");
            return None;
        }
        Some(self.commit().await)
    }

    /// Flag one item for review. Returns `false` when the id is unknown.
    pub async fn mark_needs_review(&mut self, id: &str) -> bool {
        let Some(schedule) = self.schedule.as_mut() else {
            return false;
        };
        if !schedule.mark_needs_review(id) {
            debug!(id, "ignoring review flag on unknown item");
            return false;
        }
        self.commit().await;
        true
    }

    /// Complete everything scheduled for the clock's current day.
    pub async fn mark_today_completed(&mut self) -> usize {
        let today = self.clock.today();
        let Some(schedule) = self.schedule.as_mut() else {
            return 0;
        };
        let changed = schedule.mark_day_completed(today);
        if changed > 0 {
            self.commit().await;
        }
        changed
    }

    /// Persist the current flags and refresh statistics. Write failures keep
    /// the in-memory change.
    async fn commit(&mut self) -> ProgressStats {
        let record = self
            .schedule
            .as_ref()
            .map(|s| s.progress_record(self.clock.now()))
            .unwrap_or_else(ProgressRecord::default);
        if let Err(err) = self.repo.save_progress(&record).await {
            error!(error = %err, "failed to persist revision progress");
        }
        self.refresh()
    }
}
