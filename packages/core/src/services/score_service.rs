//! Minigame leaderboard

use crate::db::RecordStore;
use crate::models::{HighScore, NewHighScore};
use crate::services::ServiceError;
use chrono::{DateTime, NaiveTime, SubsecRound, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Entries shown on each leaderboard
pub const LEADERBOARD_SIZE: usize = 5;

pub struct ScoreService {
    records: Arc<dyn RecordStore>,
}

impl ScoreService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    pub async fn submit(&self, score: NewHighScore) -> Result<HighScore, ServiceError> {
        let score = score.normalized()?;
        let stored = HighScore {
            score_id: Uuid::new_v4().to_string(),
            initials: score.initials,
            time: score.time,
            created_at: Utc::now().trunc_subsecs(6),
        };
        self.records.insert_high_score(stored.clone()).await?;
        tracing::info!(initials = %stored.initials, time = stored.time, "High score recorded");
        Ok(stored)
    }

    /// Longest play times of all time
    pub async fn all_time(&self) -> Result<Vec<HighScore>, ServiceError> {
        Ok(self.records.top_high_scores(None, LEADERBOARD_SIZE).await?)
    }

    /// Longest play times since UTC midnight
    pub async fn today(&self) -> Result<Vec<HighScore>, ServiceError> {
        self.today_as_of(Utc::now()).await
    }

    /// Leaderboard for the UTC day containing `now`
    pub async fn today_as_of(&self, now: DateTime<Utc>) -> Result<Vec<HighScore>, ServiceError> {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Ok(self
            .records
            .top_high_scores(Some(midnight), LEADERBOARD_SIZE)
            .await?)
    }
}
