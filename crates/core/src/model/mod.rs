pub mod curriculum;
mod difficulty;
mod fallback;
mod ids;
mod progress;
mod record;

pub use curriculum::{
    Component, ComponentDocument, Curriculum, CurriculumDocument, CurriculumError, Objective,
    ObjectiveDocument, ObjectiveShape, SubObjective, SubObjectiveDocument, Subtopic,
    SubtopicDocument, Topic, TopicDocument,
};
pub use difficulty::{Difficulty, DifficultyHistogram, ParseDifficultyError};
pub use ids::{ComponentId, ItemId, ObjectiveId, SubtopicId, TopicId};
pub use progress::Progress;
pub use record::{CheckedState, ProgressRecord};
