#![forbid(unsafe_code)]

pub mod app_context;
pub mod checklist_service;
pub mod config;
pub mod error;
pub mod refresh;
pub mod revision_service;
pub mod source;

pub use study_core::Clock;

pub use app_context::AppContext;
pub use checklist_service::ChecklistService;
pub use config::AppConfig;
pub use error::{AppContextError, SourceError};
pub use refresh::{DailyRefresh, ManualRefreshScheduler, RefreshScheduler, TokioRefreshScheduler};
pub use revision_service::RevisionService;
pub use source::{
    CurriculumOrigin, CurriculumSource, FileCurriculumSource, HttpCurriculumSource,
    LoadedCurriculum, load_or_fallback,
};
