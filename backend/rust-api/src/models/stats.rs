use serde::{Deserialize, Serialize};

/// Local learning counters. `quiz_score` never exceeds `quizzes_completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub quiz_score: u32,
    #[serde(default)]
    pub quizzes_completed: u32,
    #[serde(default)]
    pub scramble_completed: u32,
}

impl UserStats {
    pub fn record_quiz_answer(self, correct: bool) -> Self {
        Self {
            quiz_score: self.quiz_score.saturating_add(u32::from(correct)),
            quizzes_completed: self.quizzes_completed.saturating_add(1),
            ..self
        }
        .normalized()
    }

    pub fn record_scramble(self) -> Self {
        Self {
            scramble_completed: self.scramble_completed.saturating_add(1),
            ..self
        }
    }

    /// Percentage of correct quiz answers, 0 before the first quiz.
    pub fn accuracy(&self) -> u32 {
        if self.quizzes_completed == 0 {
            return 0;
        }
        let score = u64::from(self.quiz_score);
        let total = u64::from(self.quizzes_completed);
        ((200 * score + total) / (2 * total)) as u32
    }

    /// Clamps a hand-edited or corrupted record back inside the invariant.
    pub fn normalized(self) -> Self {
        Self {
            quiz_score: self.quiz_score.min(self.quizzes_completed),
            ..self
        }
    }
}
