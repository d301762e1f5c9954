use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;

use quiz_core::model::{GameSummary, Level};
use quiz_core::QuestionGenerator;

use super::countdown::{self, Countdown};
use super::session::{Resolution, SessionState, Tick};
use super::snapshot::GameSnapshot;
use crate::Clock;
use crate::cues::{Cue, CuePlayer};
use crate::streak_service::StreakService;

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What happened to a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// No question was open (not started, or already over).
    Ignored,
    /// Scored and moved to the next question.
    Next { correct: bool },
    /// Scored the tenth question and ended the game.
    Finished { correct: bool, summary: GameSummary },
}

impl GameOutcome {
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        match self {
            GameOutcome::Ignored => None,
            GameOutcome::Next { correct } | GameOutcome::Finished { correct, .. } => {
                Some(*correct)
            }
        }
    }

    fn cue(&self) -> Option<Cue> {
        self.is_correct().map(Cue::for_answer)
    }
}

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

struct EngineState {
    generator: Box<dyn QuestionGenerator>,
    session: Option<SessionState>,
    streak_count: u32,
    countdown: Option<Countdown>,
    generation: u64,
}

impl EngineState {
    fn snapshot(&self) -> GameSnapshot {
        match &self.session {
            Some(session) => GameSnapshot::from_session(session, self.streak_count),
            None => GameSnapshot::not_started(self.streak_count),
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    fn is_current_countdown(&self, generation: u64) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|countdown| countdown.generation() == generation)
    }
}

struct Shared {
    state: Mutex<EngineState>,
    cues: Arc<dyn CuePlayer>,
    clock: Clock,
    updates: watch::Sender<GameSnapshot>,
    runtime: Option<Handle>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &EngineState) {
        self.updates.send_replace(state.snapshot());
    }

    fn play(&self, cue: Cue) {
        if let Err(err) = self.cues.play(cue) {
            tracing::warn!(error = %err, ?cue, "cue playback failed");
        }
    }

    /// Replace any running countdown with a fresh one for the current question.
    ///
    /// Must be called with the state lock held.
    fn arm_countdown(self: &Arc<Self>, state: &mut EngineState) {
        state.cancel_countdown();

        if !state.session.as_ref().is_some_and(SessionState::wants_countdown) {
            return;
        }
        let Some(runtime) = self.runtime.as_ref() else {
            tracing::warn!("no tokio runtime available; countdown disabled");
            return;
        };

        let countdown = Countdown::new(state.generation);
        let generation = countdown.generation();
        let token = countdown.token();
        state.countdown = Some(countdown);

        let weak = Arc::downgrade(self);
        runtime.spawn(countdown::run(token, move || {
            weak.upgrade()
                .is_some_and(|shared| shared.tick(generation))
        }));
    }

    /// Score the open question. Must be called with the state lock held.
    fn resolve_locked(
        self: &Arc<Self>,
        state: &mut EngineState,
        value: Option<i64>,
    ) -> GameOutcome {
        let has_question = state
            .session
            .as_ref()
            .is_some_and(|session| session.current_question().is_some());
        if !has_question {
            return GameOutcome::Ignored;
        }

        state.cancel_countdown();

        let now = self.clock.now();
        let resolution = {
            let EngineState {
                generator, session, ..
            } = &mut *state;
            session
                .as_mut()
                .and_then(|session| session.resolve(value, generator.as_mut(), now))
        };
        let Some(resolution) = resolution else {
            return GameOutcome::Ignored;
        };

        let outcome = match resolution {
            Resolution::Finished { correct, summary } => {
                tracing::info!(
                    score = summary.score(),
                    total = summary.total(),
                    "game over"
                );
                GameOutcome::Finished { correct, summary }
            }
            Resolution::Next { correct } => {
                self.arm_countdown(state);
                GameOutcome::Next { correct }
            }
        };

        self.publish(state);
        outcome
    }

    /// One countdown second. Returns `false` once this countdown is finished.
    fn tick(self: &Arc<Self>, generation: u64) -> bool {
        let outcome = {
            let mut state = self.lock();
            if !state.is_current_countdown(generation) {
                return false;
            }
            let tick = match state.session.as_mut() {
                Some(session) => session.tick(),
                None => Tick::Idle,
            };
            match tick {
                Tick::Running(_) => {
                    self.publish(&state);
                    return true;
                }
                Tick::Idle => return false,
                Tick::Expired => {
                    tracing::debug!("question timed out");
                    self.resolve_locked(&mut state, None)
                }
            }
        };

        if let Some(cue) = outcome.cue() {
            self.play(cue);
        }
        false
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Ten-question arithmetic quiz session with an optional per-question countdown.
///
/// `start` and `submit_answer` run synchronously under one lock; the countdown is
/// the only asynchronous writer and is cancelled before every question change.
/// Countdowns are spawned on the Tokio runtime the engine was created in.
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl GameEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        streak_count: u32,
        cues: Arc<dyn CuePlayer>,
        generator: Box<dyn QuestionGenerator>,
    ) -> Self {
        let state = EngineState {
            generator,
            session: None,
            streak_count,
            countdown: None,
            generation: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                cues,
                clock,
                updates,
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    /// Count today's play towards the streak, then build the engine.
    pub async fn initialize(
        streaks: &StreakService,
        cues: Arc<dyn CuePlayer>,
        generator: Box<dyn QuestionGenerator>,
    ) -> Self {
        let streak = streaks.record_play().await;
        Self::new(streaks.clock(), streak.streak_count(), cues, generator)
    }

    /// Begin a new game, discarding any game in progress.
    pub fn start(&self, level: Level) {
        let mut state = self.shared.lock();
        state.cancel_countdown();

        let first = state.generator.next_question();
        state.session = Some(SessionState::start(level, first, self.shared.clock.now()));
        self.shared.arm_countdown(&mut state);
        self.shared.publish(&state);
        tracing::info!(level = level.index(), "game started");
    }

    /// Like `start`, but takes an unchecked level number (out of range means untimed).
    pub fn start_raw(&self, level: i64) {
        self.start(Level::from_raw(level));
    }

    /// Play again at the level of the last game (untimed if none).
    pub fn restart(&self) {
        let level = self
            .shared
            .lock()
            .session
            .as_ref()
            .map(SessionState::level)
            .unwrap_or_default();
        self.start(level);
    }

    /// Leave the current game and return to the not-started state.
    pub fn quit(&self) {
        let mut state = self.shared.lock();
        state.cancel_countdown();
        state.session = None;
        self.shared.publish(&state);
    }

    /// Score `value` against the open question. `None` always counts as wrong.
    pub fn submit_answer(&self, value: Option<i64>) -> GameOutcome {
        let outcome = {
            let mut state = self.shared.lock();
            self.shared.resolve_locked(&mut state, value)
        };

        if let Some(cue) = outcome.cue() {
            self.shared.play(cue);
        }
        outcome
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.lock().snapshot()
    }

    /// Receiver that sees a fresh snapshot after every change, including ticks.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.shared.updates.subscribe()
    }

    #[must_use]
    pub fn streak_count(&self) -> u32 {
        self.shared.lock().streak_count
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        self.shared.lock().cancel_countdown();
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("GameEngine")
            .field("session", &state.session)
            .field("streak_count", &state.streak_count)
            .field("generation", &state.generation)
            .field("countdown_armed", &state.countdown.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cues::SilentCues;
    use crate::game::snapshot::GamePhase;
    use quiz_core::RandomQuestions;
    use quiz_core::time::fixed_clock;

    fn engine() -> GameEngine {
        GameEngine::new(
            fixed_clock(),
            3,
            Arc::new(SilentCues),
            Box::new(RandomQuestions::seeded(11)),
        )
    }

    #[test]
    fn submit_before_start_is_ignored() {
        let engine = engine();
        assert_eq!(engine.submit_answer(Some(1)), GameOutcome::Ignored);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, GamePhase::NotStarted);
        assert_eq!(snapshot.questions_answered, 0);
        assert_eq!(snapshot.streak_count, 3);
    }

    #[test]
    fn untimed_start_without_runtime_has_no_countdown() {
        let engine = engine();
        engine.start(Level::Untimed);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.time_remaining, None);
        assert!(snapshot.current_question.is_some());
        assert_eq!(snapshot.phase, GamePhase::InProgress { question_number: 1 });
    }

    #[test]
    fn out_of_range_level_falls_back_to_untimed() {
        let engine = engine();
        engine.start_raw(9);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.level, Level::Untimed);
        assert_eq!(snapshot.time_remaining, None);
    }

    #[test]
    fn quit_returns_to_not_started() {
        let engine = engine();
        engine.start(Level::Untimed);
        engine.quit();
        assert_eq!(engine.snapshot().phase, GamePhase::NotStarted);
        assert_eq!(engine.submit_answer(Some(0)), GameOutcome::Ignored);
    }
}
