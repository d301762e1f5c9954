use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::model::{Operation, Question};

//
// ─── GENERATION ────────────────────────────────────────────────────────────────
//

/// Operand range shared by every operator.
const MIN_OPERAND: i64 = 1;
const MAX_OPERAND: i64 = 12;
/// Upper bound for the minuend of a subtraction.
const MAX_MINUEND: i64 = 24;

/// Draw one arithmetic question from `rng`.
///
/// Subtraction never goes negative and division is always exact.
pub fn generate_question<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let operation = Operation::ALL[rng.random_range(0..Operation::ALL.len())];

    match operation {
        Operation::Add => {
            let a = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            let b = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            Question::new(a, b, operation, a + b)
        }
        Operation::Subtract => {
            let b = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            let a = rng.random_range(b..=MAX_MINUEND);
            Question::new(a, b, operation, a - b)
        }
        Operation::Multiply => {
            let a = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            let b = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            Question::new(a, b, operation, a * b)
        }
        Operation::Divide => {
            let divisor = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            let quotient = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
            Question::new(divisor * quotient, divisor, operation, quotient)
        }
    }
}

//
// ─── GENERATOR SEAM ────────────────────────────────────────────────────────────
//

/// Source of questions for a game session.
pub trait QuestionGenerator: Send {
    fn next_question(&mut self) -> Question;
}

/// Uniform random questions backed by a boxed RNG.
pub struct RandomQuestions {
    rng: Box<dyn RngCore + Send>,
}

impl RandomQuestions {
    #[must_use]
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self { rng }
    }

    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(Box::new(StdRng::from_os_rng()))
    }

    /// Reproducible sequence for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }
}

impl Default for RandomQuestions {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl QuestionGenerator for RandomQuestions {
    fn next_question(&mut self) -> Question {
        generate_question(self.rng.as_mut())
    }
}

impl std::fmt::Debug for RandomQuestions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomQuestions").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample(count: usize) -> Vec<Question> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..count).map(|_| generate_question(&mut rng)).collect()
    }

    #[test]
    fn subtraction_never_goes_negative() {
        for q in sample(2_000)
            .into_iter()
            .filter(|q| q.operation() == Operation::Subtract)
        {
            assert!(q.first_operand() >= q.second_operand());
            assert_eq!(q.first_operand() - q.second_operand(), q.answer());
            assert!((MIN_OPERAND..=MAX_OPERAND).contains(&q.second_operand()));
            assert!(q.first_operand() <= MAX_MINUEND);
        }
    }

    #[test]
    fn division_is_exact() {
        for q in sample(2_000)
            .into_iter()
            .filter(|q| q.operation() == Operation::Divide)
        {
            assert!(q.second_operand() >= 1);
            assert_eq!(q.second_operand() * q.answer(), q.first_operand());
            assert!((MIN_OPERAND..=MAX_OPERAND).contains(&q.answer()));
        }
    }

    #[test]
    fn answers_match_operator() {
        for q in sample(2_000) {
            assert_eq!(
                q.operation().apply(q.first_operand(), q.second_operand()),
                Some(q.answer())
            );
        }
    }

    #[test]
    fn every_operator_is_drawn() {
        let seen: HashSet<_> = sample(500).iter().map(Question::operation).collect();
        assert_eq!(seen.len(), Operation::ALL.len());
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = RandomQuestions::seeded(99);
        let mut b = RandomQuestions::seeded(99);
        for _ in 0..20 {
            assert_eq!(a.next_question(), b.next_question());
        }
    }
}
