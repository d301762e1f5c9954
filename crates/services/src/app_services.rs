use std::sync::Arc;

use quiz_core::{QuestionGenerator, RandomQuestions};
use storage::repository::Storage;

use crate::Clock;
use crate::cues::CuePlayer;
use crate::error::AppServicesError;
use crate::game::GameEngine;
use crate::profile_service::ProfileService;
use crate::streak_service::StreakService;

/// Assembles app-facing services around one game engine.
#[derive(Clone)]
pub struct AppServices {
    engine: Arc<GameEngine>,
    profile: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        cues: Arc<dyn CuePlayer>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let generator = Box::new(RandomQuestions::from_os_rng());
        Ok(Self::from_storage(&storage, clock, cues, generator).await)
    }

    /// Build services over an already-open storage backend.
    ///
    /// Records today's play for the streak as part of engine start-up.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        cues: Arc<dyn CuePlayer>,
        generator: Box<dyn QuestionGenerator>,
    ) -> Self {
        let streaks = StreakService::new(clock, Arc::clone(&storage.preferences));
        let profile = Arc::new(ProfileService::new(Arc::clone(&storage.preferences)));
        let engine = Arc::new(GameEngine::initialize(&streaks, cues, generator).await);

        Self { engine, profile }
    }

    #[must_use]
    pub fn engine(&self) -> Arc<GameEngine> {
        Arc::clone(&self.engine)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }
}
