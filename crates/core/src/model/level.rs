use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("invalid level value: {0} (expected 0, 1 or 2)")]
    InvalidLevel(i64),
}

/// Difficulty tier. Only the per-question countdown differs between levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// No time limit.
    #[default]
    Untimed,
    /// 20 seconds per question.
    Timed20,
    /// 10 seconds per question.
    Timed10,
}

impl Level {
    /// Maps a raw level number, falling back to `Untimed` for anything out of range.
    #[must_use]
    pub fn from_raw(value: i64) -> Self {
        Self::try_from(value).unwrap_or_default()
    }

    /// Numeric level as shown to the player.
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Level::Untimed => 0,
            Level::Timed20 => 1,
            Level::Timed10 => 2,
        }
    }

    /// Seconds on the countdown for each question, or `None` when untimed.
    #[must_use]
    pub fn countdown_secs(self) -> Option<u32> {
        match self {
            Level::Untimed => None,
            Level::Timed20 => Some(20),
            Level::Timed10 => Some(10),
        }
    }

    #[must_use]
    pub fn is_timed(self) -> bool {
        self.countdown_secs().is_some()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Level::Untimed => "Level 0 - No Time Limit",
            Level::Timed20 => "Level 1 - 20 Seconds",
            Level::Timed10 => "Level 2 - 10 Seconds",
        }
    }
}

impl TryFrom<i64> for Level {
    type Error = LevelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Level::Untimed),
            1 => Ok(Level::Timed20),
            2 => Ok(Level::Timed10),
            other => Err(LevelError::InvalidLevel(other)),
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_durations_per_level() {
        assert_eq!(Level::Untimed.countdown_secs(), None);
        assert_eq!(Level::Timed20.countdown_secs(), Some(20));
        assert_eq!(Level::Timed10.countdown_secs(), Some(10));
    }

    #[test]
    fn out_of_range_falls_back_to_untimed() {
        assert_eq!(Level::from_raw(7), Level::Untimed);
        assert_eq!(Level::from_raw(-1), Level::Untimed);
        assert_eq!(Level::from_raw(2), Level::Timed10);
    }

    #[test]
    fn strict_conversion_rejects_unknown_levels() {
        assert_eq!(Level::try_from(1_u8), Ok(Level::Timed20));
        assert_eq!(Level::try_from(3_u8), Err(LevelError::InvalidLevel(3)));
    }
}
