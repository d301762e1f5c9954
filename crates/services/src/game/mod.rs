mod countdown;
mod engine;
mod session;
mod snapshot;

// Public API of the game subsystem.
pub use engine::{GameEngine, GameOutcome};
pub use snapshot::{GamePhase, GameSnapshot};
