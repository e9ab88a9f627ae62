use chrono::NaiveDate;
use serde::Deserialize;

use study_core::DateRange;
use study_core::calendar::CalendarError;

use crate::source::{CurriculumSource, source_for};

pub const DEFAULT_CURRICULUM: &str = "resources/learning-objectives.json";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://study.sqlite3";

/// Runtime settings. Every field has a default so partial config files and
/// `STUDY_*` environment overrides are both valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File path or `http(s)://` URL of the curriculum document.
    pub curriculum: String,
    pub database_url: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            curriculum: DEFAULT_CURRICULUM.to_owned(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap_or_default(),
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `CalendarError::InvertedRange` when the end date precedes the start.
    pub fn date_range(&self) -> Result<DateRange, CalendarError> {
        DateRange::new(self.start_date, self.end_date)
    }

    #[must_use]
    pub fn curriculum_source(&self) -> Box<dyn CurriculumSource> {
        source_for(&self.curriculum)
    }
}
