use std::sync::Mutex;

use crate::error::CueError;

/// Feedback signal raised after each answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Correct,
    Incorrect,
}

impl Cue {
    #[must_use]
    pub fn for_answer(correct: bool) -> Self {
        if correct { Cue::Correct } else { Cue::Incorrect }
    }
}

/// Best-effort audio trigger supplied by the front end.
///
/// Called outside the engine lock; implementations must not block for long.
pub trait CuePlayer: Send + Sync {
    /// Play the given cue.
    ///
    /// # Errors
    ///
    /// Returns `CueError` if playback fails. The engine never propagates it.
    fn play(&self, cue: Cue) -> Result<(), CueError>;
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Records every cue it is asked to play. Can be told to fail each call.
#[derive(Debug, Default)]
pub struct RecordingCues {
    played: Mutex<Vec<Cue>>,
    fail: bool,
}

impl RecordingCues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose `play` records the cue and then reports failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[must_use]
    pub fn played(&self) -> Vec<Cue> {
        self.played
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CuePlayer for RecordingCues {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        self.played
            .lock()
            .map_err(|e| CueError::Playback(e.to_string()))?
            .push(cue);
        if self.fail {
            return Err(CueError::Unavailable);
        }
        Ok(())
    }
}
