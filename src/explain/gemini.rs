//! Gemini API client for explanation generation

use crate::error::{MatcherError, Result};
use crate::explain::LanguageModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Gemini generateContent endpoint. Retries rate limits
/// and server errors with exponential backoff; everything that survives the
/// retries surfaces as a recoverable explanation error.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Build from the `GEMINI_API_KEY` environment variable.
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            MatcherError::Configuration(format!("{} environment variable is not set", API_KEY_ENV))
        })?;
        Ok(Self::new(api_key, model.to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut last_error: Option<MatcherError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                log::warn!(
                    "Explanation call attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                log::warn!("Explanation API returned {}: {}", status, body);
                last_error = Some(MatcherError::Explanation(format!(
                    "API returned {}: {}",
                    status, body
                )));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MatcherError::Explanation(format!(
                    "API returned {}: {}",
                    status, body
                )));
            }

            let parsed: GenerateResponse = response.json().await?;
            let text = parsed
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.trim().to_string())
                .unwrap_or_default();

            if text.is_empty() {
                return Err(MatcherError::Explanation(
                    "Model returned empty content".to_string(),
                ));
            }
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| {
            MatcherError::Explanation(format!("Rate limited after {} retries", MAX_RETRIES))
        }))
    }
}
