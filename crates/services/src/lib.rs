#![forbid(unsafe_code)]

pub mod app_services;
pub mod cues;
pub mod error;
pub mod game;
pub mod profile_service;
pub mod streak_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use cues::{Cue, CuePlayer, RecordingCues, SilentCues};
pub use error::{AppServicesError, CueError, ProfileServiceError, StreakServiceError};
pub use game::{GameEngine, GameOutcome, GamePhase, GameSnapshot};
pub use profile_service::{DEFAULT_USER_NAME, ProfileService};
pub use streak_service::StreakService;
