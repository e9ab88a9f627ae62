use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty tier: {0}")]
pub struct ParseDifficultyError(String);

/// Difficulty tier of a learning objective.
///
/// The derived ordering is the scheduling order: foundation material is
/// revised before intermediate, intermediate before advanced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Foundation,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Foundation,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Foundation => "foundation",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foundation" => Ok(Self::Foundation),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ParseDifficultyError(s.to_owned())),
        }
    }
}

/// Count of objectives per difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyHistogram {
    pub foundation: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

impl DifficultyHistogram {
    pub fn record(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Foundation => self.foundation += 1,
            Difficulty::Intermediate => self.intermediate += 1,
            Difficulty::Advanced => self.advanced += 1,
        }
    }

    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Foundation => self.foundation,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.foundation + self.intermediate + self.advanced
    }
}

impl FromIterator<Difficulty> for DifficultyHistogram {
    fn from_iter<I: IntoIterator<Item = Difficulty>>(iter: I) -> Self {
        let mut histogram = Self::default();
        for difficulty in iter {
            histogram.record(difficulty);
        }
        histogram
    }
}
