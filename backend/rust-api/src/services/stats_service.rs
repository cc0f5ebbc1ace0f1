use anyhow::Result;

use super::storage::KeyValueBackend;
use crate::models::UserStats;

pub const STATS_KEY: &str = "lv_stats";

/// Owns every read and write of the stats record. Each update is a whole-record
/// read-modify-write; concurrent writers are not coordinated, the last one wins.
pub struct StatsStore<B: KeyValueBackend> {
    backend: B,
}

impl<B: KeyValueBackend> StatsStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Zeroed stats when nothing is stored or the stored record is unreadable.
    pub fn load(&self) -> Result<UserStats> {
        let Some(raw) = self.backend.get(STATS_KEY)? else {
            return Ok(UserStats::default());
        };

        match serde_json::from_str::<UserStats>(&raw) {
            Ok(stats) => Ok(stats.normalized()),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stats record: {}", e);
                Ok(UserStats::default())
            }
        }
    }

    pub fn save(&self, stats: &UserStats) -> Result<()> {
        let raw = serde_json::to_string(stats)?;
        self.backend.set(STATS_KEY, &raw)
    }

    pub fn record_quiz_answer(&self, correct: bool) -> Result<UserStats> {
        self.update(|stats| stats.record_quiz_answer(correct))
    }

    pub fn record_scramble(&self) -> Result<UserStats> {
        self.update(UserStats::record_scramble)
    }

    fn update(&self, apply: impl FnOnce(UserStats) -> UserStats) -> Result<UserStats> {
        let updated = apply(self.load()?);
        self.save(&updated)?;
        tracing::debug!(
            quiz_score = updated.quiz_score,
            quizzes_completed = updated.quizzes_completed,
            scramble_completed = updated.scramble_completed,
            "Stats updated"
        );
        Ok(updated)
    }
}
