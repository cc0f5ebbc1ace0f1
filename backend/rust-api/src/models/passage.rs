use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use crate::error::GenerationError;
use crate::utils::ids::{part_id, short_id};

/// Academic passage split into parts. `parts` is the authoritative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_unique_part_ids"))]
pub struct AcademicPassage {
    pub id: String,
    #[validate(length(min = 1))]
    pub topic: String,
    #[validate(length(min = 1))]
    pub full_text: String,
    #[validate(length(min = 2), nested)]
    pub parts: Vec<ScramblePart>,
    pub explanation: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScramblePart {
    pub id: String,
    #[validate(length(min = 1))]
    pub text: String,
}

// The direct model schema emits parts as bare strings, the proxy schema as
// objects that may lack an id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPart {
    Text(String),
    Part {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPassage {
    #[serde(default)]
    id: Option<String>,
    topic: String,
    full_text: String,
    parts: Vec<RawPart>,
    explanation: String,
    translation: String,
}

impl AcademicPassage {
    /// Parses and validates a raw model/proxy payload, backfilling missing ids.
    pub fn from_json(raw: &str) -> Result<Self, GenerationError> {
        let raw: RawPassage = serde_json::from_str(raw)?;

        let parts = raw
            .parts
            .into_iter()
            .enumerate()
            .map(|(index, part)| match part {
                RawPart::Text(text) => ScramblePart {
                    id: part_id(index),
                    text,
                },
                RawPart::Part { id, text } => ScramblePart {
                    id: id
                        .filter(|id| !id.trim().is_empty())
                        .unwrap_or_else(|| part_id(index)),
                    text,
                },
            })
            .collect();

        let passage = AcademicPassage {
            id: raw
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(short_id),
            topic: raw.topic,
            full_text: raw.full_text,
            parts,
            explanation: raw.explanation,
            translation: raw.translation,
        };
        passage.validate()?;
        Ok(passage)
    }
}

fn validate_unique_part_ids(passage: &AcademicPassage) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if passage.parts.iter().all(|part| seen.insert(part.id.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_part_id"))
    }
}
