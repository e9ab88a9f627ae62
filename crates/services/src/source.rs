use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use study_core::model::{Curriculum, CurriculumDocument};

use crate::error::SourceError;

/// Somewhere a curriculum document can be fetched from.
#[async_trait]
pub trait CurriculumSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Fetch and validate the curriculum.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the document cannot be read or is malformed.
    async fn fetch(&self) -> Result<Curriculum, SourceError>;
}

/// Reads the curriculum from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileCurriculumSource {
    path: PathBuf,
}

impl FileCurriculumSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CurriculumSource for FileCurriculumSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Curriculum, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(Curriculum::from_json(&raw)?)
    }
}

/// Fetches the curriculum document over HTTP.
#[derive(Clone)]
pub struct HttpCurriculumSource {
    client: Client,
    url: String,
}

impl HttpCurriculumSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CurriculumSource for HttpCurriculumSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Curriculum, SourceError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status()));
        }
        let document: CurriculumDocument = response.json().await?;
        Ok(Curriculum::from_document(document)?)
    }
}

/// Pick a source for a configured location: `http(s)://` URLs go over the
/// network, anything else is treated as a file path.
#[must_use]
pub fn source_for(location: &str) -> Box<dyn CurriculumSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpCurriculumSource::new(location))
    } else {
        Box::new(FileCurriculumSource::new(location))
    }
}

/// Where the active curriculum came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurriculumOrigin {
    Source(String),
    Fallback,
}

impl fmt::Display for CurriculumOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(location) => f.write_str(location),
            Self::Fallback => f.write_str("built-in sample"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedCurriculum {
    pub curriculum: Arc<Curriculum>,
    pub origin: CurriculumOrigin,
}

/// Fetch from `source`, substituting the built-in sample curriculum when the
/// source cannot be read or parsed. Never fails.
pub async fn load_or_fallback(source: &dyn CurriculumSource) -> LoadedCurriculum {
    let location = source.describe();
    match source.fetch().await {
        Ok(curriculum) => {
            info!(
                source = %location,
                components = curriculum.components().len(),
                objectives = curriculum.leaf_count(),
                "curriculum loaded"
            );
            LoadedCurriculum {
                curriculum: Arc::new(curriculum),
                origin: CurriculumOrigin::Source(location),
            }
        }
        Err(err) => {
            warn!(source = %location, error = %err, "failed to load curriculum; using sample");
            LoadedCurriculum {
                curriculum: Arc::new(Curriculum::fallback()),
                origin: CurriculumOrigin::Fallback,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_for_dispatches_on_scheme() {
        assert_eq!(source_for("https://example.org/c.json").describe(), "https://example.org/c.json");
        assert_eq!(source_for("resources/c.json").describe(), "resources/c.json");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = FileCurriculumSource::new("definitely/not/here.json");
        assert!(matches!(source.fetch().await, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn unreadable_source_falls_back_to_sample() {
        let loaded = load_or_fallback(&FileCurriculumSource::new("definitely/not/here.json")).await;
        assert_eq!(loaded.origin, CurriculumOrigin::Fallback);
        assert_eq!(loaded.curriculum.leaf_count(), 10);
    }
}
