use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::GenerationError;
use crate::utils::ids::short_id;

/// One etymology multiple-choice question as produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_answer"))]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    pub word: String,
    /// `"<English definition> (<Japanese definition>)"`
    #[validate(length(equal = 4))]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[validate(nested)]
    pub etymology: Etymology,
    #[validate(length(min = 2, max = 3), nested)]
    pub family_words: Vec<FamilyWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Etymology {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FamilyWord {
    #[validate(custom(function = "not_blank"))]
    pub word: String,
    pub meaning: String,
}

impl QuizQuestion {
    /// Parses and validates a raw model/proxy payload, assigning an id when absent.
    pub fn from_json(raw: &str) -> Result<Self, GenerationError> {
        let mut question: QuizQuestion = serde_json::from_str(raw)?;
        question.validate()?;
        if question.id.trim().is_empty() {
            question.id = short_id();
        }
        Ok(question)
    }

    pub fn is_correct(&self, option: &str) -> bool {
        option == self.correct_answer
    }
}

impl Etymology {
    /// Labelled prefix/root/suffix entries that are present and non-blank.
    pub fn components(&self) -> Vec<(&'static str, &str)> {
        [
            ("Prefix", self.prefix.as_deref()),
            ("Root", self.root.as_deref()),
            ("Suffix", self.suffix.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| match value {
            Some(v) if !v.trim().is_empty() => Some((label, v)),
            _ => None,
        })
        .collect()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// A correct answer that drifted from the option text is rejected rather than
// fuzzy-matched.
fn validate_correct_answer(question: &QuizQuestion) -> Result<(), ValidationError> {
    if question
        .options
        .iter()
        .any(|option| option == &question.correct_answer)
    {
        Ok(())
    } else {
        Err(ValidationError::new("correct_answer_not_in_options"))
    }
}
