use serde_json::{json, Value};

use super::gemini_client::ModelRequest;
use crate::models::GenerationTask;

const QUIZ_PROMPT: &str = "Create one advanced academic English vocabulary question \
(SAT / GRE / TOEFL, CEFR C1-C2) that teaches the word through its etymology.
- word: the target word.
- options: exactly 4 distinct, plausible definitions. Every option must read \
\"English definition (日本語の定義)\".
- correctAnswer: copy the correct option character for character.
- etymology: split the word into prefix, root and suffix where they exist, and \
write a thorough scholarly explanation in Japanese.
- familyWords: 2-3 related words sharing the root, each with its meaning in Japanese.
Respond with JSON only.";

const SCRAMBLE_PROMPT: &str = "Create one academic passage reordering exercise.
- topic: a scientific, historical, psychological or philosophical subject.
- fullText: 3-5 sophisticated sentences forming one coherent argument.
- parts: the passage divided into 5-7 logical chunks, listed in the correct order, \
each with a short unique id.
- explanation: an analysis in Japanese of the logical flow and the connective \
cues that fix the order.
- translation: a natural, polished Japanese translation of the passage.
Respond with JSON only.";

pub fn prompt_for(task: GenerationTask) -> &'static str {
    match task {
        GenerationTask::Quiz => QUIZ_PROMPT,
        GenerationTask::Scramble => SCRAMBLE_PROMPT,
    }
}

pub fn schema_for(task: GenerationTask) -> Value {
    match task {
        GenerationTask::Quiz => quiz_schema(),
        GenerationTask::Scramble => passage_schema(),
    }
}

pub fn model_request(task: GenerationTask, api_key: &str, model: &str) -> ModelRequest {
    ModelRequest {
        api_key: api_key.to_string(),
        model: model.to_string(),
        prompt: prompt_for(task).to_string(),
        schema: schema_for(task),
    }
}

fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "word": { "type": "STRING" },
            "options": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Exactly 4 distinct options formatted 'English (Japanese)'"
            },
            "correctAnswer": { "type": "STRING" },
            "etymology": {
                "type": "OBJECT",
                "properties": {
                    "prefix": { "type": "STRING" },
                    "root": { "type": "STRING" },
                    "suffix": { "type": "STRING" },
                    "explanation": { "type": "STRING" }
                },
                "required": ["explanation"]
            },
            "familyWords": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "meaning": { "type": "STRING" }
                    },
                    "required": ["word", "meaning"]
                }
            }
        },
        "required": ["word", "options", "correctAnswer", "etymology", "familyWords"]
    })
}

fn passage_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "topic": { "type": "STRING" },
            "fullText": { "type": "STRING" },
            "parts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "text": { "type": "STRING" }
                    },
                    "required": ["text"]
                },
                "description": "Chunks in the correct order"
            },
            "explanation": { "type": "STRING" },
            "translation": { "type": "STRING" }
        },
        "required": ["topic", "fullText", "parts", "explanation", "translation"]
    })
}
