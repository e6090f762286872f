use rc_core::{Analysis, Delay, Error, GenerationConstraints, InferenceModel, Result, TokioDelay};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::AnalysisSettings;

pub mod prompt;
pub mod response;

pub use prompt::{analysis_schema, build_prompt, truncate_chars};
pub use response::{normalize_response, parse_analysis};

/// Result of analysing one passage. Generation failures never escape as errors;
/// they end up as `Fallback` carrying the last error seen.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Generated { analysis: Analysis, attempts: u32 },
    Fallback { attempts: u32, last_error: Error },
}

impl AnalysisOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Generated { attempts, .. } | Self::Fallback { attempts, .. } => *attempts,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn into_analysis(self) -> Analysis {
        match self {
            Self::Generated { analysis, .. } => analysis,
            Self::Fallback { .. } => Analysis::fallback(),
        }
    }
}

pub struct AnalysisGenerator {
    model: Arc<dyn InferenceModel>,
    delay: Arc<dyn Delay>,
    settings: AnalysisSettings,
}

impl fmt::Debug for AnalysisGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisGenerator")
            .field("model", &self.model.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl AnalysisGenerator {
    pub fn new(model: Arc<dyn InferenceModel>, settings: AnalysisSettings) -> Self {
        Self {
            model,
            delay: Arc::new(TokioDelay),
            settings,
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    fn constraints(&self) -> GenerationConstraints {
        if self.model.supports_structured_output() {
            GenerationConstraints {
                response_schema: Some(analysis_schema()),
            }
        } else {
            GenerationConstraints::default()
        }
    }

    fn backoff(&self, retry: u32) -> Duration {
        self.settings
            .backoff_base
            .saturating_mul(1u32 << retry.min(16))
    }

    /// One generation call: transport errors and schema violations both come back as `Err`.
    async fn attempt(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<Analysis> {
        let raw = self
            .model
            .generate(prompt, constraints)
            .await
            .map_err(|e| {
                if e.is_generation() {
                    e
                } else {
                    Error::Transport(e.to_string())
                }
            })?;

        let text = if self.model.supports_structured_output() {
            raw.trim().to_string()
        } else {
            normalize_response(&raw)
        };
        debug!("Model returned {} chars", text.len());

        let analysis = parse_analysis(&text)?;
        if analysis.questions.len() != self.settings.question_count {
            warn!(
                "Expected {} questions, model returned {}",
                self.settings.question_count,
                analysis.questions.len()
            );
        }
        Ok(analysis)
    }

    pub async fn analyze(&self, passage_text: &str) -> AnalysisOutcome {
        self.analyze_with_retries(passage_text, self.settings.max_retries).await
    }

    /// Analyse a passage, retrying up to `max_retries` times with exponential
    /// backoff. The model is called at most `max_retries + 1` times.
    pub async fn analyze_with_retries(&self, passage_text: &str, max_retries: u32) -> AnalysisOutcome {
        let excerpt = truncate_chars(passage_text, self.settings.max_passage_chars);
        if excerpt.len() < passage_text.len() {
            debug!(
                "Passage truncated to {} chars for the prompt",
                self.settings.max_passage_chars
            );
        }
        let prompt = build_prompt(excerpt, self.settings.question_count);
        let constraints = self.constraints();

        let mut retries = 0;
        loop {
            let attempts = retries + 1;
            match self.attempt(&prompt, &constraints).await {
                Ok(analysis) => return AnalysisOutcome::Generated { analysis, attempts },
                Err(e) if retries >= max_retries => {
                    warn!(
                        "⚠️ Giving up after {} attempt(s), using fallback analysis: {}",
                        attempts, e
                    );
                    return AnalysisOutcome::Fallback {
                        attempts,
                        last_error: e,
                    };
                }
                Err(e) => {
                    let wait = self.backoff(retries);
                    warn!(
                        "🔁 Attempt {}/{} failed ({}), retrying in {:?}",
                        attempts,
                        max_retries + 1,
                        e,
                        wait
                    );
                    self.delay.sleep(wait).await;
                    retries += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const VALID: &str = r#"{"tone": "Reflective", "summary": "Memory shapes identity.", "questions": [
        {"question": "What can be inferred?", "options": ["a", "b", "c", "d"], "correct_index": 1, "explanation": "b"},
        {"question": "What is the main idea?", "options": ["a", "b", "c", "d"], "correct_index": 0, "explanation": "a"},
        {"question": "Which detail is stated?", "options": ["a", "b", "c", "d"], "correct_index": 3, "explanation": "d"}
    ]}"#;

    /// Replays scripted responses and records every prompt it receives.
    #[derive(Debug)]
    struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
        schemas: Mutex<Vec<bool>>,
        structured: bool,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
                schemas: Mutex::new(Vec::new()),
                structured: false,
            }
        }

        fn structured(mut self) -> Self {
            self.structured = true;
            self
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InferenceModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn supports_structured_output(&self) -> bool {
            self.structured
        }

        async fn generate(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.schemas.lock().unwrap().push(constraints.response_schema.is_some());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("still not json".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn generator(model: Arc<ScriptedModel>, delay: Arc<RecordingDelay>) -> AnalysisGenerator {
        AnalysisGenerator::new(model, AnalysisSettings::default()).with_delay(delay)
    }

    #[tokio::test]
    async fn test_always_malformed_falls_back() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let delay = Arc::new(RecordingDelay::default());
        let generator = generator(model.clone(), delay.clone());

        let outcome = generator.analyze_with_retries("A passage.", 3).await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.attempts(), 4);
        assert_eq!(model.calls(), 4);
        assert_eq!(outcome.into_analysis(), Analysis::fallback());
        assert_eq!(
            *delay.waits.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn test_zero_retries_calls_once() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let delay = Arc::new(RecordingDelay::default());
        let outcome = generator(model.clone(), delay.clone())
            .analyze_with_retries("A passage.", 0)
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(model.calls(), 1);
        assert!(delay.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_on_second_attempt() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("Sorry, I cannot help with that.".to_string()),
            Ok(VALID.to_string()),
        ]));
        let delay = Arc::new(RecordingDelay::default());
        let outcome = generator(model.clone(), delay.clone())
            .analyze_with_retries("A passage.", 3)
            .await;

        assert_eq!(model.calls(), 2);
        assert_eq!(outcome.attempts(), 2);
        let expected: Analysis = serde_json::from_str(VALID).unwrap();
        assert_eq!(outcome.into_analysis(), expected);
        assert_eq!(*delay.waits.lock().unwrap(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_transport_errors_share_the_retry_budget() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(Error::Transport("connection reset".to_string())),
            Err(Error::Config("quota exceeded".to_string())),
            Ok(format!("```json\n{}\n```", VALID)),
        ]));
        let delay = Arc::new(RecordingDelay::default());
        let outcome = generator(model.clone(), delay)
            .analyze_with_retries("A passage.", 2)
            .await;

        assert!(!outcome.is_fallback());
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_fallback_keeps_last_error() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(Error::Transport("timeout".to_string())),
            Ok(r#"{"tone": "x", "summary": "y", "questions": [{"question": "Q", "options": ["a"], "correct_index": 0, "explanation": "e"}]}"#.to_string()),
        ]));
        let outcome = generator(model, Arc::new(RecordingDelay::default()))
            .analyze_with_retries("A passage.", 1)
            .await;

        match outcome {
            AnalysisOutcome::Fallback { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last_error, Error::Schema(_)));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_errors_are_reported_as_transport() {
        let model = Arc::new(ScriptedModel::new(vec![Err(Error::Config(
            "quota exceeded".to_string(),
        ))]));
        let outcome = generator(model, Arc::new(RecordingDelay::default()))
            .analyze_with_retries("A passage.", 0)
            .await;

        match outcome {
            AnalysisOutcome::Fallback { last_error, .. } => {
                assert!(last_error.is_generation());
                assert!(matches!(last_error, Error::Transport(ref msg) if msg.contains("quota exceeded")));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_passage_is_truncated_in_prompt() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(VALID.to_string())]));
        let settings = AnalysisSettings {
            max_passage_chars: 10,
            ..Default::default()
        };
        let generator = AnalysisGenerator::new(model.clone(), settings)
            .with_delay(Arc::new(RecordingDelay::default()));

        generator.analyze("0123456789ABCDEFGHIJ").await;

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("0123456789"));
        assert!(!prompts[0].contains("ABCDEFGHIJ"));
    }

    #[tokio::test]
    async fn test_structured_models_receive_schema() {
        let freeform = Arc::new(ScriptedModel::new(vec![Ok(VALID.to_string())]));
        generator(freeform.clone(), Arc::new(RecordingDelay::default()))
            .analyze("A passage.")
            .await;
        assert_eq!(*freeform.schemas.lock().unwrap(), vec![false]);

        let structured = Arc::new(ScriptedModel::new(vec![Ok(VALID.to_string())]).structured());
        let outcome = generator(structured.clone(), Arc::new(RecordingDelay::default()))
            .analyze("A passage.")
            .await;
        assert!(!outcome.is_fallback());
        assert_eq!(*structured.schemas.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_backoff_doubles() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let generator = generator(model, Arc::new(RecordingDelay::default()));
        assert_eq!(generator.backoff(0), Duration::from_secs(1));
        assert_eq!(generator.backoff(3), Duration::from_secs(8));
        // large retry counts saturate instead of overflowing
        assert!(generator.backoff(u32::MAX) >= Duration::from_secs(65536));
    }
}
