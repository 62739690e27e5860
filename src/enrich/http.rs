//! OpenAI-compatible chat completion provider.
//!
//! Sends the code with a fixed instruction asking for a JSON object
//! `{"issues": [...], "confidence": n}` and parses the reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{EnrichError, Enrichment, EnrichmentProvider};
use crate::config::EnrichmentConfig;

const SYSTEM_PROMPT: &str = "You review source code written by learners. Reply with only a JSON object of the form {\"issues\": [{\"severity\": \"critical|high|medium|low|info\", \"category\": \"syntax|logic|performance|security|style|maintainability|best_practice\", \"line\": 1, \"column\": 1, \"message\": \"...\", \"explanation\": \"...\", \"suggestion\": \"...\", \"example_fix\": \"...\", \"confidence\": 0.0}], \"confidence\": 0.0}. Report only real problems.";

/// Provider backed by a chat completions endpoint.
pub struct HttpProvider {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl HttpProvider {
    /// Build a provider from config. The API key is read from the
    /// environment variable named by `api_key_env`.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                EnrichError::NotConfigured(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;

        let http = Client::builder()
            .user_agent(concat!("codelens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request_body(&self, code: &str, language: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("Language: {}\n\n```{}\n{}\n```", language, language, code),
                },
            ],
        })
    }
}

#[async_trait]
impl EnrichmentProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(&self, code: &str, language: &str) -> Result<Enrichment, EnrichError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(code, language))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichError::Timeout
                } else {
                    EnrichError::Network(e)
                }
            })?;

        match response.status().as_u16() {
            200..=299 => {}
            429 => return Err(EnrichError::RateLimited),
            status @ (401 | 403) => {
                return Err(EnrichError::Unavailable(format!(
                    "authentication rejected (HTTP {})",
                    status
                )))
            }
            status => return Err(EnrichError::Unavailable(format!("HTTP {}", status))),
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EnrichError::InvalidResponse("no choices in response".to_string()))?;

        parse_content(&content)
    }
}

/// Parse the model reply, tolerating a surrounding Markdown code fence.
pub(crate) fn parse_content(content: &str) -> Result<Enrichment, EnrichError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```")
        .map(|rest| {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.trim_end().strip_suffix("```").unwrap_or(rest)
        })
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim())
        .map_err(|e| EnrichError::InvalidResponse(format!("content is not the expected JSON: {}", e)))
}
