#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::{KeyValueStore, StorageError};
use study_core::model::Curriculum;

/// One component, one topic, one subtopic: a plain objective `a` and a
/// parent objective `b` with sub-objectives `b.1` and `b.2`.
pub const SMALL_CURRICULUM: &str = r#"{
  "components": [{
    "componentId": "01",
    "title": "Computer Systems",
    "topics": [{
      "topicId": "1.1",
      "title": "Processors",
      "subtopics": [{
        "subtopicId": "1.1.1",
        "title": "Structure of the processor",
        "learningObjectives": [
          { "id": "a", "objective": "Describe the ALU", "type": "knowledge", "difficulty": "foundation" },
          { "id": "b", "objective": "Explain the FDE cycle", "type": "understanding", "difficulty": "intermediate",
            "subObjectives": [
              { "id": "b.1", "objective": "Fetch" },
              { "id": "b.2", "objective": "Decode and execute" }
            ] }
        ]
      }]
    }]
  }]
}"#;

pub fn small_curriculum() -> Arc<Curriculum> {
    Arc::new(Curriculum::from_json(SMALL_CURRICULUM).expect("valid curriculum"))
}

/// Reads succeed with nothing stored; every write fails.
#[derive(Clone, Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}
