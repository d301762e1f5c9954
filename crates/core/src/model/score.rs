use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Level;

/// Whole-number percentage of `score` out of `total`, rounded down.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(score.min(total)) * 100 / u64::from(total);
    u32::try_from(pct).unwrap_or(100)
}

/// Coarse performance tier shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    /// 80% and above.
    Excellent,
    /// 60% to 79%.
    Good,
    /// 40% to 59%.
    Fair,
    NeedsWork,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(pct: u32) -> Self {
        match pct {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::NeedsWork,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsWork => "Needs work",
        }
    }
}

/// Final result of a completed game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    level: Level,
    score: u32,
    total: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    countdown_elapsed_secs: u32,
}

impl GameSummary {
    /// Build a summary. `score` is capped at `total` and a `completed_at`
    /// earlier than `started_at` is pinned to `started_at`.
    #[must_use]
    pub fn new(
        level: Level,
        score: u32,
        total: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        countdown_elapsed_secs: u32,
    ) -> Self {
        Self {
            level,
            score: score.min(total),
            total,
            started_at,
            completed_at: completed_at.max(started_at),
            countdown_elapsed_secs,
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Wall-clock time from start to game over.
    #[must_use]
    pub fn time_taken(&self) -> Duration {
        self.completed_at - self.started_at
    }

    /// Seconds consumed on the countdown across all questions. Zero when untimed.
    #[must_use]
    pub fn countdown_elapsed_secs(&self) -> u32 {
        self.countdown_elapsed_secs
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage())
    }
}
