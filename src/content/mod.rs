// src/content/mod.rs
//
// The course catalog itself lives outside this crate; the engagement core
// only needs something that can produce quiz questions. `QuestionSource`
// is that seam, and `JsonQuestionBank` is the file-backed implementation
// the binary wires in.

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

pub trait QuestionSource: Send + Sync {
    /// Draw up to `count` questions. Fewer (or none) is a valid outcome
    /// when the bank is small or empty.
    fn draw(&self, count: usize) -> Vec<QuizQuestion>;
}

/// Question bank loaded from a JSON file (an array of questions).
pub struct JsonQuestionBank {
    questions: Vec<QuizQuestion>,
}

impl JsonQuestionBank {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)?;
        let questions: Vec<QuizQuestion> = serde_json::from_str(&raw)?;
        Ok(Self { questions })
    }

    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionSource for JsonQuestionBank {
    fn draw(&self, count: usize) -> Vec<QuizQuestion> {
        let mut picked: Vec<QuizQuestion> = self.questions.clone();
        picked.shuffle(&mut rand::rng());
        picked.truncate(count);
        picked
    }
}
