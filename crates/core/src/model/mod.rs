mod level;
mod question;
mod score;
mod streak;

pub use level::{Level, LevelError};
pub use question::{Operation, Question};
pub use score::{GameSummary, ScoreBand, percentage};
pub use streak::{DATE_FORMAT, StreakError, StreakRecord, StreakUpdate};

/// Number of questions in one game session.
pub const QUESTIONS_PER_SESSION: u32 = 10;
