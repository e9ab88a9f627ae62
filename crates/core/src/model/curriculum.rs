use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::difficulty::Difficulty;
use crate::model::ids::{ComponentId, ObjectiveId, SubtopicId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurriculumError {
    #[error("curriculum document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{kind} id cannot be empty")]
    EmptyId { kind: &'static str },

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
}

//
// ─── SOURCE DOCUMENT ───────────────────────────────────────────────────────────
//

/// Wire shape of the curriculum document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumDocument {
    pub components: Vec<ComponentDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDocument {
    pub component_id: String,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<TopicDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocument {
    pub topic_id: String,
    pub title: String,
    #[serde(default)]
    pub subtopics: Vec<SubtopicDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicDocument {
    pub subtopic_id: String,
    pub title: String,
    #[serde(default)]
    pub learning_objectives: Vec<ObjectiveDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDocument {
    pub id: String,
    pub objective: String,
    #[serde(rename = "type", default)]
    pub objective_type: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_objectives: Option<Vec<SubObjectiveDocument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubObjectiveDocument {
    pub id: String,
    pub objective: String,
}

//
// ─── TREE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubObjective {
    pub id: ObjectiveId,
    pub text: String,
}

/// Whether an objective is itself a completion unit or only groups its
/// sub-objectives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveShape {
    Leaf,
    /// Never empty; an empty list is normalised to `Leaf` on load.
    Parent(Vec<SubObjective>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub id: ObjectiveId,
    pub text: String,
    pub objective_type: String,
    pub difficulty: Difficulty,
    pub shape: ObjectiveShape,
}

impl Objective {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.shape, ObjectiveShape::Leaf)
    }

    #[must_use]
    pub fn sub_objectives(&self) -> &[SubObjective] {
        match &self.shape {
            ObjectiveShape::Leaf => &[],
            ObjectiveShape::Parent(subs) => subs,
        }
    }

    /// Ids of the completion units under this objective.
    pub fn leaf_ids(&self) -> Box<dyn Iterator<Item = &ObjectiveId> + '_> {
        match &self.shape {
            ObjectiveShape::Leaf => Box::new(std::iter::once(&self.id)),
            ObjectiveShape::Parent(subs) => Box::new(subs.iter().map(|s| &s.id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtopic {
    pub id: SubtopicId,
    pub title: String,
    pub objectives: Vec<Objective>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub subtopics: Vec<Subtopic>,
}

impl Topic {
    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.subtopics.iter().flat_map(|s| s.objectives.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    pub title: String,
    pub topics: Vec<Topic>,
}

impl Component {
    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.topics.iter().flat_map(Topic::objectives)
    }
}

/// Validated, read-only curriculum tree.
///
/// Every objective and sub-objective id is unique across the tree, as are
/// component, topic and subtopic ids within their own level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curriculum {
    components: Vec<Component>,
}

impl Curriculum {
    /// Build a curriculum from already-constructed components.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::EmptyId` or `CurriculumError::DuplicateId`
    /// when the id invariants do not hold.
    pub fn new(components: Vec<Component>) -> Result<Self, CurriculumError> {
        validate(&components)?;
        Ok(Self { components })
    }

    /// Skips validation for trees built inside this crate.
    pub(crate) fn from_trusted(components: Vec<Component>) -> Self {
        debug_assert!(validate(&components).is_ok());
        Self { components }
    }

    /// Parse and validate a JSON curriculum document.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::Parse` for malformed JSON and the validation
    /// errors of [`Curriculum::new`].
    pub fn from_json(json: &str) -> Result<Self, CurriculumError> {
        let document: CurriculumDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Convert the wire document into the validated tree.
    ///
    /// # Errors
    ///
    /// See [`Curriculum::new`].
    pub fn from_document(document: CurriculumDocument) -> Result<Self, CurriculumError> {
        let components = document
            .components
            .into_iter()
            .map(|c| Component {
                id: ComponentId::new(c.component_id),
                title: c.title,
                topics: c
                    .topics
                    .into_iter()
                    .map(|t| Topic {
                        id: TopicId::new(t.topic_id),
                        title: t.title,
                        subtopics: t
                            .subtopics
                            .into_iter()
                            .map(|s| Subtopic {
                                id: SubtopicId::new(s.subtopic_id),
                                title: s.title,
                                objectives: s
                                    .learning_objectives
                                    .into_iter()
                                    .map(objective_from_document)
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self::new(components)
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.components.iter().flat_map(Component::objectives)
    }

    /// Total number of completion units in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.objectives().map(|o| o.leaf_ids().count()).sum()
    }
}

fn objective_from_document(doc: ObjectiveDocument) -> Objective {
    let shape = match doc.sub_objectives {
        Some(subs) if !subs.is_empty() => ObjectiveShape::Parent(
            subs.into_iter()
                .map(|s| SubObjective {
                    id: ObjectiveId::new(s.id),
                    text: s.objective,
                })
                .collect(),
        ),
        _ => ObjectiveShape::Leaf,
    };
    Objective {
        id: ObjectiveId::new(doc.id),
        text: doc.objective,
        objective_type: doc.objective_type,
        difficulty: doc.difficulty,
        shape,
    }
}

fn validate(components: &[Component]) -> Result<(), CurriculumError> {
    fn claim<'a>(
        seen: &mut HashSet<&'a str>,
        kind: &'static str,
        id: &'a str,
    ) -> Result<(), CurriculumError> {
        if id.trim().is_empty() {
            return Err(CurriculumError::EmptyId { kind });
        }
        if !seen.insert(id) {
            return Err(CurriculumError::DuplicateId {
                kind,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    let mut component_ids = HashSet::new();
    let mut topic_ids = HashSet::new();
    let mut subtopic_ids = HashSet::new();
    let mut objective_ids = HashSet::new();

    for component in components {
        claim(&mut component_ids, "component", component.id.as_str())?;
        for topic in &component.topics {
            claim(&mut topic_ids, "topic", topic.id.as_str())?;
            for subtopic in &topic.subtopics {
                claim(&mut subtopic_ids, "subtopic", subtopic.id.as_str())?;
                for objective in &subtopic.objectives {
                    claim(&mut objective_ids, "objective", objective.id.as_str())?;
                    for sub in objective.sub_objectives() {
                        claim(&mut objective_ids, "objective", sub.id.as_str())?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
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
                        {"id": "1.1.1.a", "objective": "ALU", "type": "knowledge", "difficulty": "foundation"},
                        {"id": "1.1.1.b", "objective": "Registers", "type": "knowledge", "difficulty": "intermediate",
                         "subObjectives": [
                            {"id": "1.1.1.b.i", "objective": "PC"},
                            {"id": "1.1.1.b.ii", "objective": "ACC"}
                         ]},
                        {"id": "1.1.1.c", "objective": "Buses", "subObjectives": []}
                    ]
                }]
            }]
        }]
    }"#;

    #[test]
    fn parses_document_into_tagged_shapes() {
        let curriculum = Curriculum::from_json(SAMPLE).unwrap();
        let objectives: Vec<_> = curriculum.objectives().collect();
        assert_eq!(objectives.len(), 3);
        assert!(objectives[0].is_leaf());
        assert_eq!(objectives[1].sub_objectives().len(), 2);
        assert_eq!(objectives[1].difficulty, Difficulty::Intermediate);
        // empty sub-objective list falls back to a plain leaf
        assert!(objectives[2].is_leaf());
        assert_eq!(objectives[2].objective_type, "");
        assert_eq!(objectives[2].difficulty, Difficulty::Foundation);
    }

    #[test]
    fn leaf_count_skips_parent_objectives() {
        let curriculum = Curriculum::from_json(SAMPLE).unwrap();
        assert_eq!(curriculum.leaf_count(), 4);
    }

    #[test]
    fn rejects_duplicate_leaf_ids() {
        let json = SAMPLE.replace("1.1.1.b.ii", "1.1.1.a");
        let err = Curriculum::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CurriculumError::DuplicateId { kind: "objective", ref id } if id == "1.1.1.a"
        ));
    }

    #[test]
    fn rejects_empty_ids() {
        let json = SAMPLE.replace("\"topicId\": \"1.1\"", "\"topicId\": \" \"");
        assert!(matches!(
            Curriculum::from_json(&json),
            Err(CurriculumError::EmptyId { kind: "topic" })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Curriculum::from_json("{\"components\": ["),
            Err(CurriculumError::Parse(_))
        ));
    }
}
