use async_trait::async_trait;
use reqwest::Client;
use rc_core::{Error, GenerationConstraints, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use super::InferenceModel;
use crate::Config;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL_ID: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub(crate) fn require_api_key(config: &Config, provider: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{} API key is required", provider)))
}

pub(crate) fn base_url(config: &Config, default: &str) -> Result<String> {
    let raw = config.model_url.as_deref().unwrap_or(default);
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Google Gemini `generateContent`. Supports JSON-mode responses constrained by a schema.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = require_api_key(config, "Gemini")?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url(config, DEFAULT_BASE_URL)?,
            model_id: config
                .model_id
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_id)
    }
}

#[async_trait]
impl InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn supports_structured_output(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, constraints: &GenerationConstraints) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: constraints.response_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Some(schema.clone()),
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("Gemini returned {}: {}", status, body)));
        }

        let response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid Gemini response body: {}", e)))?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Transport("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Transport(format!(
                "Gemini returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            model_name: Some("gemini".to_string()),
            model_id: Some("gemini-test".to_string()),
            model_url: Some(server.uri()),
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(&Config::default());
        assert_eq!(result.unwrap_err().to_string(), "Configuration error: Gemini API key is required");

        let blank = Config {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(GeminiModel::new(&blank).is_err());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = Config {
            api_key: Some("k".to_string()),
            model_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(GeminiModel::new(&config), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_generate_with_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"tone\": \"Wry\"}" }], "role": "model" },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let constraints = GenerationConstraints {
            response_schema: Some(json!({ "type": "OBJECT" })),
        };
        let text = model.generate("prompt", &constraints).await.unwrap();
        assert_eq!(text, "{\"tone\": \"Wry\"}");
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let err = model
            .generate("prompt", &GenerationConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(ref msg) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let model = GeminiModel::new(&config(&server)).unwrap();
        let err = model
            .generate("prompt", &GenerationConstraints::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
