use crate::model::curriculum::{
    Component, Curriculum, Objective, ObjectiveShape, Subtopic, Topic,
};
use crate::model::difficulty::Difficulty;
use crate::model::ids::{ComponentId, ObjectiveId, SubtopicId, TopicId};

const FALLBACK_OBJECTIVES: [&str; 10] = [
    "CPU Architecture and Components",
    "Fetch-Decode-Execute Cycle",
    "Factors Affecting CPU Performance",
    "Pipelining and Processor Efficiency",
    "Von Neumann vs Harvard Architecture",
    "CISC vs RISC Processors",
    "Graphics Processing Units (GPUs)",
    "Multicore and Parallel Systems",
    "Input, Output and Storage Devices",
    "Magnetic, Flash and Optical Storage",
];

impl Curriculum {
    /// Small built-in dataset used when the real curriculum cannot be loaded.
    ///
    /// Ten plain objectives under one component/topic/subtopic: three
    /// foundation, four intermediate, three advanced.
    #[must_use]
    pub fn fallback() -> Self {
        let objectives = FALLBACK_OBJECTIVES
            .iter()
            .enumerate()
            .map(|(index, text)| Objective {
                id: ObjectiveId::new(format!("1.1.1.{}", letter(index))),
                text: (*text).to_owned(),
                objective_type: match index % 3 {
                    0 => "knowledge",
                    1 => "understanding",
                    _ => "application",
                }
                .to_owned(),
                difficulty: match index {
                    0..3 => Difficulty::Foundation,
                    3..7 => Difficulty::Intermediate,
                    _ => Difficulty::Advanced,
                },
                shape: ObjectiveShape::Leaf,
            })
            .collect();

        Self::from_trusted(vec![Component {
            id: ComponentId::new("01"),
            title: "Computer Systems".into(),
            topics: vec![Topic {
                id: TopicId::new("1.1"),
                title: "Processor Architecture".into(),
                subtopics: vec![Subtopic {
                    id: SubtopicId::new("1.1.1"),
                    title: "Structure and function of the processor".into(),
                    objectives,
                }],
            }],
        }])
    }
}

fn letter(index: usize) -> char {
    let offset = u8::try_from(index % 26).unwrap_or(0);
    char::from(b'a' + offset)
}
