#![forbid(unsafe_code)]

pub mod generator;
pub mod model;
pub mod time;

pub use generator::{QuestionGenerator, RandomQuestions, generate_question};
pub use time::Clock;
