use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used for the persisted last-played date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreakError {
    #[error("invalid last played date: {raw}")]
    InvalidDate { raw: String },

    #[error("streak count must be non-negative, got {0}")]
    NegativeCount(i64),
}

/// Consecutive-day play counter and the day it was last bumped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    streak_count: u32,
    last_played: Option<NaiveDate>,
}

/// Result of applying a play on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub record: StreakRecord,
    pub changed: bool,
}

impl StreakRecord {
    #[must_use]
    pub fn new(streak_count: u32, last_played: Option<NaiveDate>) -> Self {
        Self {
            streak_count,
            last_played,
        }
    }

    /// Rehydrate a record from the raw persisted fields.
    ///
    /// A missing count reads as zero and a missing date as "never played".
    ///
    /// # Errors
    ///
    /// Returns `StreakError::InvalidDate` if the date is not ISO `YYYY-MM-DD`.
    /// Returns `StreakError::NegativeCount` if the stored count is negative.
    pub fn from_persisted(
        streak_count: Option<i64>,
        last_played: Option<&str>,
    ) -> Result<Self, StreakError> {
        let count = streak_count.unwrap_or(0);
        let streak_count = u32::try_from(count).map_err(|_| StreakError::NegativeCount(count))?;
        let last_played = last_played
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| StreakError::InvalidDate {
                    raw: raw.to_owned(),
                })
            })
            .transpose()?;

        Ok(Self {
            streak_count,
            last_played,
        })
    }

    #[must_use]
    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    #[must_use]
    pub fn last_played(&self) -> Option<NaiveDate> {
        self.last_played
    }

    /// Last played date formatted for storage.
    #[must_use]
    pub fn last_played_iso(&self) -> Option<String> {
        self.last_played
            .map(|date| date.format(DATE_FORMAT).to_string())
    }

    /// Record a play on `today`.
    ///
    /// Same day leaves the record untouched. Playing the day after the last play
    /// extends the streak; any other gap (or a first play) restarts it at 1.
    #[must_use]
    pub fn advance(self, today: NaiveDate) -> StreakUpdate {
        if self.last_played == Some(today) {
            return StreakUpdate {
                record: self,
                changed: false,
            };
        }

        let yesterday = today.checked_sub_days(Days::new(1));
        let streak_count = if self.last_played.is_some() && self.last_played == yesterday {
            self.streak_count.saturating_add(1)
        } else {
            1
        };

        StreakUpdate {
            record: Self {
                streak_count,
                last_played: Some(today),
            },
            changed: true,
        }
    }
}
