use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GenerationError;

pub mod passage;
pub mod quiz;
pub mod stats;

pub use passage::{AcademicPassage, ScramblePart};
pub use quiz::{Etymology, FamilyWord, QuizQuestion};
pub use stats::UserStats;

/// Task discriminator selecting the prompt and schema pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTask {
    Quiz,
    Scramble,
}

impl GenerationTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationTask::Quiz => "quiz",
            GenerationTask::Scramble => "scramble",
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationTask {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(GenerationTask::Quiz),
            "scramble" => Ok(GenerationTask::Scramble),
            _ => Err(GenerationError::InvalidTask),
        }
    }
}

/// Inbound body of `POST /api/generate`. The task stays a raw string so unknown
/// values can be answered with the proxy's own 400 body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub task: Option<String>,
}

impl GenerateRequest {
    pub fn for_task(task: GenerationTask) -> Self {
        Self {
            task: Some(task.as_str().to_string()),
        }
    }

    pub fn parse_task(&self) -> Result<GenerationTask, GenerationError> {
        self.task
            .as_deref()
            .ok_or(GenerationError::InvalidTask)?
            .parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
