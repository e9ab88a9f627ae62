use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{
    CheckedState, Component, ComponentId, Curriculum, Objective, ObjectiveId, ObjectiveShape,
    Progress, Subtopic, SubtopicId, Topic, TopicId,
};

//
// ─── NODE KEYS ─────────────────────────────────────────────────────────────────
//

/// Identifies a node whose aggregate a front-end may display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Component(ComponentId),
    Topic(TopicId),
    Subtopic(SubtopicId),
    /// A plain objective, a parent objective or a sub-objective.
    Objective(ObjectiveId),
}

/// Result of flipping or setting a leaf.
///
/// `stale` lists the nodes whose aggregate changed, nearest first: the
/// objective owning the leaf, then its subtopic, topic and component. It is
/// empty when the id is not a leaf of the loaded curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub id: ObjectiveId,
    pub checked: bool,
    pub stale: Vec<NodeKey>,
}

impl ToggleOutcome {
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        !self.stale.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct ObjectivePath {
    component: usize,
    topic: usize,
    subtopic: usize,
    objective: usize,
    sub: Option<usize>,
}

//
// ─── CHECKLIST ─────────────────────────────────────────────────────────────────
//

/// Curriculum tree paired with its checked-state snapshot.
///
/// Aggregates are always derived from the leaf flags, so there is no cached
/// parent state that could drift.
#[derive(Debug, Clone)]
pub struct Checklist {
    curriculum: Arc<Curriculum>,
    state: CheckedState,
    objectives: HashMap<ObjectiveId, ObjectivePath>,
    subtopics: HashMap<SubtopicId, (usize, usize, usize)>,
    topics: HashMap<TopicId, (usize, usize)>,
    components: HashMap<ComponentId, usize>,
}

impl Checklist {
    #[must_use]
    pub fn new(curriculum: Arc<Curriculum>, state: CheckedState) -> Self {
        let mut objectives = HashMap::new();
        let mut subtopics = HashMap::new();
        let mut topics = HashMap::new();
        let mut components = HashMap::new();

        for (ci, component) in curriculum.components().iter().enumerate() {
            components.insert(component.id.clone(), ci);
            for (ti, topic) in component.topics.iter().enumerate() {
                topics.insert(topic.id.clone(), (ci, ti));
                for (si, subtopic) in topic.subtopics.iter().enumerate() {
                    subtopics.insert(subtopic.id.clone(), (ci, ti, si));
                    for (oi, objective) in subtopic.objectives.iter().enumerate() {
                        let path = ObjectivePath {
                            component: ci,
                            topic: ti,
                            subtopic: si,
                            objective: oi,
                            sub: None,
                        };
                        objectives.insert(objective.id.clone(), path);
                        for (xi, sub) in objective.sub_objectives().iter().enumerate() {
                            objectives.insert(
                                sub.id.clone(),
                                ObjectivePath {
                                    sub: Some(xi),
                                    ..path
                                },
                            );
                        }
                    }
                }
            }
        }

        Self {
            curriculum,
            state,
            objectives,
            subtopics,
            topics,
            components,
        }
    }

    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    #[must_use]
    pub fn state(&self) -> &CheckedState {
        &self.state
    }

    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.state.is_checked(id)
    }

    /// True when `id` names a completion unit of the loaded tree.
    #[must_use]
    pub fn is_leaf(&self, id: &str) -> bool {
        self.objectives
            .get(id)
            .is_some_and(|path| path.sub.is_some() || self.objective_at(path).is_leaf())
    }

    //
    // ─── AGGREGATION ───────────────────────────────────────────────────────────
    //

    /// A parent objective counts only its sub-objectives; a plain objective
    /// counts as one leaf.
    #[must_use]
    pub fn objective_progress(&self, objective: &Objective) -> Progress {
        match &objective.shape {
            ObjectiveShape::Leaf => Progress::leaf(self.is_checked(objective.id.as_str())),
            ObjectiveShape::Parent(subs) => subs
                .iter()
                .map(|sub| Progress::leaf(self.is_checked(sub.id.as_str())))
                .sum(),
        }
    }

    #[must_use]
    pub fn subtopic_progress(&self, subtopic: &Subtopic) -> Progress {
        subtopic
            .objectives
            .iter()
            .map(|o| self.objective_progress(o))
            .sum()
    }

    #[must_use]
    pub fn topic_progress(&self, topic: &Topic) -> Progress {
        topic.objectives().map(|o| self.objective_progress(o)).sum()
    }

    #[must_use]
    pub fn component_progress(&self, component: &Component) -> Progress {
        component
            .objectives()
            .map(|o| self.objective_progress(o))
            .sum()
    }

    #[must_use]
    pub fn overall_progress(&self) -> Progress {
        self.curriculum
            .objectives()
            .map(|o| self.objective_progress(o))
            .sum()
    }

    /// Aggregate for any node; unknown keys yield the empty progress.
    #[must_use]
    pub fn progress_of(&self, key: &NodeKey) -> Progress {
        match key {
            NodeKey::Component(id) => self
                .components
                .get(id)
                .map(|&ci| self.component_progress(&self.curriculum.components()[ci]))
                .unwrap_or_default(),
            NodeKey::Topic(id) => self
                .topics
                .get(id)
                .map(|&(ci, ti)| self.topic_progress(&self.curriculum.components()[ci].topics[ti]))
                .unwrap_or_default(),
            NodeKey::Subtopic(id) => self
                .subtopics
                .get(id)
                .map(|&(ci, ti, si)| {
                    self.subtopic_progress(
                        &self.curriculum.components()[ci].topics[ti].subtopics[si],
                    )
                })
                .unwrap_or_default(),
            NodeKey::Objective(id) => self
                .objectives
                .get(id)
                .map(|path| match path.sub {
                    Some(_) => Progress::leaf(self.is_checked(id.as_str())),
                    None => self.objective_progress(self.objective_at(path)),
                })
                .unwrap_or_default(),
        }
    }

    /// Nodes whose aggregate depends on the leaf `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<NodeKey> {
        if !self.is_leaf(id) {
            return Vec::new();
        }
        let Some(path) = self.objectives.get(id) else {
            return Vec::new();
        };
        let component = &self.curriculum.components()[path.component];
        let topic = &component.topics[path.topic];
        let subtopic = &topic.subtopics[path.subtopic];
        let objective = &subtopic.objectives[path.objective];

        vec![
            NodeKey::Objective(objective.id.clone()),
            NodeKey::Subtopic(subtopic.id.clone()),
            NodeKey::Topic(topic.id.clone()),
            NodeKey::Component(component.id.clone()),
        ]
    }

    //
    // ─── MUTATION ──────────────────────────────────────────────────────────────
    //

    /// Flip the flag of `id`.
    ///
    /// Ids outside the tree are still recorded; they just have no ancestors.
    pub fn toggle(&mut self, id: &ObjectiveId) -> ToggleOutcome {
        let checked = self.state.toggle(id);
        ToggleOutcome {
            id: id.clone(),
            checked,
            stale: self.ancestors(id.as_str()),
        }
    }

    pub fn set_checked(&mut self, id: &ObjectiveId, checked: bool) -> ToggleOutcome {
        let changed = self.state.is_checked(id.as_str()) != checked;
        self.state.set(id.clone(), checked);
        ToggleOutcome {
            id: id.clone(),
            checked,
            stale: if changed {
                self.ancestors(id.as_str())
            } else {
                Vec::new()
            },
        }
    }

    /// Current aggregates of the nodes listed in an outcome.
    #[must_use]
    pub fn refreshed(&self, outcome: &ToggleOutcome) -> Vec<(NodeKey, Progress)> {
        outcome
            .stale
            .iter()
            .map(|key| (key.clone(), self.progress_of(key)))
            .collect()
    }

    fn objective_at(&self, path: &ObjectivePath) -> &Objective {
        &self.curriculum.components()[path.component].topics[path.topic].subtopics
            [path.subtopic]
            .objectives[path.objective]
    }
}
