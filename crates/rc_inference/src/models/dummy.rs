use async_trait::async_trait;
use rc_core::{Analysis, GenerationConstraints, Question, Result};
use std::fmt;

use super::InferenceModel;
use crate::analysis::prompt::PASSAGE_MARKER;

/// Offline model producing a deterministic analysis from the passage itself.
/// Answers come back wrapped in a markdown fence, like a chatty LLM would.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn first_sentence(text: &str) -> String {
    let sentence = text
        .split(|c: char| c == '.' || c == '!' || c == '?')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("The passage is empty");
    format!("{}.", sentence)
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str, _constraints: &GenerationConstraints) -> Result<String> {
        let passage = prompt
            .rsplit_once(PASSAGE_MARKER)
            .map(|(_, passage)| passage.trim())
            .unwrap_or(prompt);
        let summary = first_sentence(passage);
        let words: Vec<&str> = passage.split_whitespace().take(4).collect();

        let questions = ["Which of the following can be inferred from the passage?",
            "What is the main idea of the passage?",
            "Which detail is stated in the passage?"]
            .iter()
            .enumerate()
            .map(|(i, question)| Question {
                question: question.to_string(),
                options: (0..4)
                    .map(|j| words.get(j).map(|w| w.to_string()).unwrap_or_else(|| format!("Option {}", j + 1)))
                    .collect(),
                correct_index: i % 4,
                explanation: summary.clone(),
            })
            .collect();

        let analysis = Analysis {
            tone: "Analytical".to_string(),
            summary,
            questions,
        };
        Ok(format!("```json\n{}\n```", serde_json::to_string_pretty(&analysis)?))
    }
}
