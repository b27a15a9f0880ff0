use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{AiError, RecipeGenerator};
use crate::config::GeminiConfig;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    model: String,
    generation: GenerationConfig,
    client: Client,
}

impl GeminiClient {
    /// Build a client when an API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, AiError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Some(Self {
            api_key,
            model: config.model.clone(),
            generation: GenerationConfig {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
            client,
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE_URL, self.model, self.api_key
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: self.generation.clone(),
        }
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: &GenerateResponse) -> Result<String, AiError> {
    let content = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .ok_or(AiError::EmptyResponse)?;

    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}

fn map_api_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_string(), |e| e.message);
    AiError::Api { status, message }
}

#[async_trait]
impl RecipeGenerator for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        debug!(model = %self.model, "Sending request to Gemini");

        let response = self
            .client
            .post(self.build_url())
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(map_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidJson(e.to_string()))?;
        if let Some(err) = parsed.error {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        extract_text(&parsed)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
