use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── OPERATION ────────────────────────────────────────────────────────────────
//

/// Arithmetic operator used by a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Every operator, in a stable order for uniform selection.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Symbol shown to the player.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    /// Applies the operator, returning `None` for division by zero or an inexact quotient.
    #[must_use]
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operation::Add => lhs.checked_add(rhs),
            Operation::Subtract => lhs.checked_sub(rhs),
            Operation::Multiply => lhs.checked_mul(rhs),
            Operation::Divide => {
                if rhs == 0 || lhs % rhs != 0 {
                    None
                } else {
                    Some(lhs / rhs)
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single arithmetic problem with its expected answer.
///
/// Built by the generator; never mutated once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    first_operand: i64,
    second_operand: i64,
    operation: Operation,
    answer: i64,
}

impl Question {
    #[must_use]
    pub fn new(first_operand: i64, second_operand: i64, operation: Operation, answer: i64) -> Self {
        Self {
            first_operand,
            second_operand,
            operation,
            answer,
        }
    }

    #[must_use]
    pub fn first_operand(&self) -> i64 {
        self.first_operand
    }

    #[must_use]
    pub fn second_operand(&self) -> i64 {
        self.second_operand
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn answer(&self) -> i64 {
        self.answer
    }

    /// Returns true when `value` matches the expected answer. `None` is always wrong.
    #[must_use]
    pub fn is_correct(&self, value: Option<i64>) -> bool {
        value == Some(self.answer)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.first_operand, self.operation, self.second_operand
        )
    }
}
