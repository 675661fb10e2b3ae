//! Cybersecurity quiz.
//!
//! The question bank is YAML (`data/quiz.yaml`), loaded disk-first with the
//! embedded copy as fallback. A [`QuizRun`] walks the questions in order and
//! keeps score; answers are 1-based option numbers as typed by the user.

use serde::Deserialize;
use std::path::Path;

use crate::types::{EngineError, Result};

const EMBEDDED_QUIZ: &str = include_str!("../data/quiz.yaml");

pub const QUIZ_FILE: &str = "quiz.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    /// 0-based index into `options`.
    pub answer: usize,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
struct QuizYaml {
    questions: Vec<QuizQuestion>,
}

/// Load the question bank from `dir` if present, else the embedded bank.
pub fn load_questions(dir: Option<&Path>) -> Result<Vec<QuizQuestion>> {
    if let Some(path) = dir.map(|d| d.join(QUIZ_FILE)) {
        if let Ok(text) = std::fs::read_to_string(&path) {
            match parse_questions(&text) {
                Ok(questions) => return Ok(questions),
                Err(e) => log::warn!("failed to load {} ({}), using embedded", path.display(), e),
            }
        }
    }
    parse_questions(EMBEDDED_QUIZ)
}

pub fn parse_questions(yaml: &str) -> Result<Vec<QuizQuestion>> {
    let raw: QuizYaml = serde_yaml::from_str(yaml)?;
    if raw.questions.is_empty() {
        return Err(EngineError::Quiz("question bank is empty".into()));
    }
    for (i, q) in raw.questions.iter().enumerate() {
        if q.options.len() < 2 {
            return Err(EngineError::Quiz(format!("question {} has fewer than two options", i + 1)));
        }
        if q.answer >= q.options.len() {
            return Err(EngineError::Quiz(format!("question {} answer is out of range", i + 1)));
        }
    }
    Ok(raw.questions)
}

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    /// Text of the right option.
    pub correct_option: String,
    pub explanation: String,
}

/// One pass through the question bank.
#[derive(Debug, Clone)]
pub struct QuizRun {
    questions: Vec<QuizQuestion>,
    current: usize,
    score: usize,
}

impl QuizRun {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        QuizRun { questions, current: 0, score: 0 }
    }

    /// The question awaiting an answer, if any.
    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// 1-based number of the current question.
    pub fn position(&self) -> usize {
        self.current + 1
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Answer the current question with a 1-based option number.
    ///
    /// An out-of-range choice is rejected and the question stays current.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback> {
        let q = self
            .current()
            .ok_or_else(|| EngineError::Quiz("the quiz is already finished".into()))?;
        if choice == 0 || choice > q.options.len() {
            return Err(EngineError::Quiz(format!(
                "please choose a number between 1 and {}",
                q.options.len()
            )));
        }
        let correct = choice - 1 == q.answer;
        let feedback = AnswerFeedback {
            correct,
            correct_option: q.options[q.answer].clone(),
            explanation: q.explanation.clone(),
        };
        if correct {
            self.score += 1;
        }
        self.current += 1;
        Ok(feedback)
    }
}

/// Closing remark for a final score.
pub fn score_message(score: usize, total: usize) -> &'static str {
    let percentage = if total == 0 { 0.0 } else { score as f64 / total as f64 * 100.0 };
    if percentage >= 90.0 {
        "Great job! You're a cybersecurity pro!"
    } else if percentage >= 70.0 {
        "Good job! You have a solid foundation in cybersecurity."
    } else if percentage >= 50.0 {
        "Not bad! Keep learning to stay safe online."
    } else {
        "Keep practicing! Cybersecurity is important for everyone."
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
