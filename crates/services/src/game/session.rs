use chrono::{DateTime, Utc};

use quiz_core::QuestionGenerator;
use quiz_core::model::{GameSummary, Level, QUESTIONS_PER_SESSION, Question};

/// Result of resolving the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The next question is open.
    Next { correct: bool },
    /// That was the last question.
    Finished { correct: bool, summary: GameSummary },
}

/// What a countdown tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Time left on the current question.
    Running(u32),
    /// The countdown hit zero; the question must be resolved as unanswered.
    Expired,
    /// Nothing to count down (untimed, finished, or no question).
    Idle,
}

/// Mutable state of one game, from `start` to game over.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    level: Level,
    score: u32,
    questions_answered: u32,
    current_question: Option<Question>,
    time_remaining: Option<u32>,
    is_game_over: bool,
    last_answer_correct: Option<bool>,
    started_at: DateTime<Utc>,
    countdown_elapsed_secs: u32,
    summary: Option<GameSummary>,
}

impl SessionState {
    pub fn start(level: Level, first_question: Question, started_at: DateTime<Utc>) -> Self {
        Self {
            level,
            score: 0,
            questions_answered: 0,
            current_question: Some(first_question),
            time_remaining: level.countdown_secs(),
            is_game_over: false,
            last_answer_correct: None,
            started_at,
            countdown_elapsed_secs: 0,
            summary: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn last_answer_correct(&self) -> Option<bool> {
        self.last_answer_correct
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Whether a countdown should be running right now.
    pub fn wants_countdown(&self) -> bool {
        !self.is_game_over && self.current_question.is_some() && self.level.is_timed()
    }

    /// Score the current question against `value` and move on.
    ///
    /// Returns `None` when there is no question to answer. On the last question the
    /// session ends and no further question is drawn.
    pub fn resolve(
        &mut self,
        value: Option<i64>,
        generator: &mut dyn QuestionGenerator,
        now: DateTime<Utc>,
    ) -> Option<Resolution> {
        let question = self.current_question.take()?;

        let correct = question.is_correct(value);
        if correct {
            self.score += 1;
        }
        self.questions_answered += 1;
        self.last_answer_correct = Some(correct);

        if self.questions_answered >= QUESTIONS_PER_SESSION {
            let summary = GameSummary::new(
                self.level,
                self.score,
                QUESTIONS_PER_SESSION,
                self.started_at,
                now,
                self.countdown_elapsed_secs,
            );
            self.is_game_over = true;
            self.summary = Some(summary.clone());
            return Some(Resolution::Finished { correct, summary });
        }

        self.current_question = Some(generator.next_question());
        self.time_remaining = self.level.countdown_secs();
        Some(Resolution::Next { correct })
    }

    /// Take one second off the current question's countdown.
    pub fn tick(&mut self) -> Tick {
        if !self.wants_countdown() {
            return Tick::Idle;
        }
        let Some(remaining) = self.time_remaining else {
            return Tick::Idle;
        };

        let remaining = remaining.saturating_sub(1);
        self.time_remaining = Some(remaining);
        self.countdown_elapsed_secs = self.countdown_elapsed_secs.saturating_add(1);

        if remaining == 0 {
            Tick::Expired
        } else {
            Tick::Running(remaining)
        }
    }
}
