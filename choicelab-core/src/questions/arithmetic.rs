//! Randomised arithmetic and algebra questions

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::OPTION_COUNT;

use super::{Difficulty, Question, QuestionGenerator};

/// Distractors for complex questions are kept inside this window unless the
/// answer itself falls outside it.
const DISTRACTOR_FLOOR: i64 = -20;
const DISTRACTOR_CEILING: i64 = 100;

/// Random draws before falling back to sequential distractors
const MAX_DISTRACTOR_DRAWS: usize = 64;

/// Built-in generator: algebra for the complex tier, addition for the simple tier
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticQuestionGenerator;

impl ArithmeticQuestionGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a question from a caller-supplied random source
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Question {
        match difficulty {
            Difficulty::Complex => complex_question(rng),
            Difficulty::Simple => simple_question(rng),
        }
    }
}

impl QuestionGenerator for ArithmeticQuestionGenerator {
    fn generate(&self, difficulty: Difficulty) -> Question {
        self.generate_with_rng(difficulty, &mut rand::thread_rng())
    }
}

#[derive(Debug, Clone, Copy)]
enum ComplexKind {
    Quadratic,
    Derivative,
    Linear,
    Exponent,
    System,
}

const COMPLEX_KINDS: [ComplexKind; 5] = [
    ComplexKind::Quadratic,
    ComplexKind::Derivative,
    ComplexKind::Linear,
    ComplexKind::Exponent,
    ComplexKind::System,
];

/// Render `+3` / `-3` for inline coefficients
fn signed(value: i64) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn complex_question<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let kind = COMPLEX_KINDS[rng.gen_range(0..COMPLEX_KINDS.len())];

    let (text, answer) = match kind {
        ComplexKind::Quadratic => {
            let a: i64 = rng.gen_range(1..=3);
            let b: i64 = rng.gen_range(-5..=4);
            let c: i64 = rng.gen_range(-5..=4);
            let discriminant = b * b - 4 * a * c;

            if discriminant >= 0 {
                let root = (discriminant as f64).sqrt();
                let x1 = ((-b as f64 + root) / (2 * a) as f64).round() as i64;
                let x2 = ((-b as f64 - root) / (2 * a) as f64).round() as i64;
                (
                    format!("Solve for x: {a}x² {}x {} = 0", signed(b), signed(c)),
                    x1.max(x2),
                )
            } else {
                ("Solve for x: x² - 9 = 0".to_string(), 3)
            }
        }
        ComplexKind::Derivative => {
            let n: u32 = rng.gen_range(2..=6);
            let x: i64 = rng.gen_range(1..=4);
            (
                format!("If f(x) = x^{n}, what is f'({x})?"),
                i64::from(n) * x.pow(n - 1),
            )
        }
        ComplexKind::Linear => {
            let a: i64 = rng.gen_range(2..=9);
            let b: i64 = rng.gen_range(-10..=9);
            let c: i64 = rng.gen_range(10..=39);
            (
                format!("Solve for x: {a}x {} = {c}", signed(b)),
                ((c - b) as f64 / a as f64).round() as i64,
            )
        }
        ComplexKind::Exponent => {
            let x: u32 = rng.gen_range(2..=7);
            (format!("Solve for x: 2^x = {}", 2i64.pow(x)), i64::from(x))
        }
        ComplexKind::System => {
            let x: i64 = rng.gen_range(1..=5);
            let y: i64 = rng.gen_range(1..=5);
            (format!("If x + y = {} and y = {y}, what is x?", x + y), x)
        }
    };

    let mut options = close_options(answer, rng);
    options.shuffle(rng);

    Question {
        text,
        options,
        correct_answer: answer,
    }
}

/// The answer plus three distractors near it
fn close_options<R: Rng + ?Sized>(answer: i64, rng: &mut R) -> Vec<i64> {
    let floor = DISTRACTOR_FLOOR.min(answer - 10);
    let ceiling = DISTRACTOR_CEILING.max(answer + 10);

    let mut options = vec![answer];
    let mut used = HashSet::from([answer]);

    for _ in 0..MAX_DISTRACTOR_DRAWS {
        if options.len() == OPTION_COUNT {
            break;
        }
        let wrong = if rng.gen_bool(0.5) {
            answer + rng.gen_range(-4..=3)
        } else {
            (answer as f64 * rng.gen_range(0.5..1.5)).round() as i64
        };
        if wrong > floor && wrong < ceiling && used.insert(wrong) {
            options.push(wrong);
        }
    }

    let mut step = 1;
    while options.len() < OPTION_COUNT {
        if used.insert(answer + step) {
            options.push(answer + step);
        }
        step += 1;
    }

    options
}

fn simple_question<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let a: i64 = rng.gen_range(1..=9);
    let b: i64 = rng.gen_range(1..=9);
    let answer = a + b;

    // Obviously wrong values; a small sum rules out `answer - 5`, so extra
    // positive fallbacks keep the option count at four.
    let mut distractors: Vec<i64> = Vec::with_capacity(OPTION_COUNT - 1);
    for candidate in [answer - 5, answer + 3, answer + 7, answer + 11, answer + 15] {
        if distractors.len() == OPTION_COUNT - 1 {
            break;
        }
        if candidate > 0 && candidate != answer && !distractors.contains(&candidate) {
            distractors.push(candidate);
        }
    }
    distractors.shuffle(rng);

    // The correct answer always sits first
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(answer);
    options.extend(distractors);

    Question {
        text: format!("{a} + {b}"),
        options,
        correct_answer: answer,
    }
}
