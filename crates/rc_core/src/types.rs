use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of answer options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

pub const FALLBACK_TONE: &str = "Analytical";
pub const FALLBACK_SUMMARY: &str = "Analysis unavailable.";

/// One entry of the syndication feed. Feed order is newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayCandidate {
    pub link: String,
    pub title: String,
}

impl EssayCandidate {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

impl Question {
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::Schema("question text is empty".to_string()));
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(Error::Schema(format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                self.options.len()
            )));
        }
        if self.correct_index >= OPTIONS_PER_QUESTION {
            return Err(Error::Schema(format!(
                "correct_index {} out of range",
                self.correct_index
            )));
        }
        Ok(())
    }
}

/// The AI-derived annotation for one passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub tone: String,
    pub summary: String,
    pub questions: Vec<Question>,
}

impl Analysis {
    /// The record substituted for a passage whose generation kept failing.
    pub fn fallback() -> Self {
        Self {
            tone: FALLBACK_TONE.to_string(),
            summary: FALLBACK_SUMMARY.to_string(),
            questions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (i, question) in self.questions.iter().enumerate() {
            question
                .validate()
                .map_err(|e| Error::Schema(format!("question {}: {}", i + 1, e)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: usize,
    pub text: String,
    pub tone: String,
    pub summary: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub source: String,
    pub date_scraped: NaiveDate,
}

/// The persisted artifact. Key names are read by the presentation layer and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: Metadata,
    pub passages: Vec<Passage>,
}

/// Output constraints handed to a model together with the prompt.
#[derive(Debug, Clone, Default)]
pub struct GenerationConstraints {
    /// Response schema for models that can enforce structured output.
    pub response_schema: Option<serde_json::Value>,
}
