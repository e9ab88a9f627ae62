//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;
use study_core::calendar::CalendarError;
use study_core::model::CurriculumError;

/// Errors emitted by curriculum sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("failed to read curriculum: {0}")]
    Io(#[from] std::io::Error),
    #[error("curriculum request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
}

/// Errors emitted while assembling the `AppContext`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppContextError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
