//! Minigame leaderboard entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Maximum number of characters in a player's initials
pub const MAX_INITIALS: usize = 3;

/// A finished game, as shown on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub score_id: String,
    pub initials: String,
    /// Elapsed play time in seconds
    pub time: i64,
    pub created_at: DateTime<Utc>,
}

/// Score submission from the game-over screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHighScore {
    pub initials: String,
    pub time: i64,
}

impl NewHighScore {
    /// Validate and normalize initials to upper case
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let initials = self.initials.trim().to_ascii_uppercase();

        if initials.is_empty() {
            return Err(ValidationError::MissingField("initials".to_string()));
        }
        if initials.chars().count() > MAX_INITIALS
            || !initials.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ValidationError::invalid_value(
                "initials",
                format!("expected 1-{} letters, got '{}'", MAX_INITIALS, self.initials),
            ));
        }
        if self.time < 0 {
            return Err(ValidationError::invalid_value("time", "must not be negative"));
        }

        Ok(Self {
            initials,
            time: self.time,
        })
    }
}
