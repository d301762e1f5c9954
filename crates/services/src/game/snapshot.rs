use serde::Serialize;

use quiz_core::model::{GameSummary, Level, QUESTIONS_PER_SESSION, Question};

use super::session::SessionState;

/// Where the engine sits in the game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    NotStarted,
    /// `question_number` is 1-based.
    InProgress { question_number: u32 },
    GameOver,
}

/// Read-only view of the engine for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub level: Level,
    pub score: u32,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub current_question: Option<Question>,
    pub time_remaining: Option<u32>,
    pub is_game_over: bool,
    pub streak_count: u32,
    /// Whether the most recent answer was right. `None` before the first answer.
    pub last_answer_correct: Option<bool>,
    pub summary: Option<GameSummary>,
}

impl GameSnapshot {
    pub(crate) fn not_started(streak_count: u32) -> Self {
        Self {
            phase: GamePhase::NotStarted,
            level: Level::default(),
            score: 0,
            questions_answered: 0,
            total_questions: QUESTIONS_PER_SESSION,
            current_question: None,
            time_remaining: None,
            is_game_over: false,
            streak_count,
            last_answer_correct: None,
            summary: None,
        }
    }

    pub(crate) fn from_session(session: &SessionState, streak_count: u32) -> Self {
        let phase = if session.is_game_over() {
            GamePhase::GameOver
        } else {
            GamePhase::InProgress {
                question_number: session.questions_answered() + 1,
            }
        };

        Self {
            phase,
            level: session.level(),
            score: session.score(),
            questions_answered: session.questions_answered(),
            total_questions: QUESTIONS_PER_SESSION,
            current_question: session.current_question().copied(),
            time_remaining: session.time_remaining(),
            is_game_over: session.is_game_over(),
            streak_count,
            last_answer_correct: session.last_answer_correct(),
            summary: session.summary().cloned(),
        }
    }

    /// "Question k/10" progress label, or `None` outside a running game.
    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        match self.phase {
            GamePhase::InProgress { question_number } => {
                Some(format!("Question: {question_number}/{}", self.total_questions))
            }
            GamePhase::NotStarted | GamePhase::GameOver => None,
        }
    }
}
