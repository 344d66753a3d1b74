//! Gemini `generateContent` client for crop advice

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::AdvisoryProvider;
use crate::config::AdvisoryConfig;
use crate::error::{Result, ShellError};

const PREAMBLE: &str = "You are KhetGo AI, an agricultural advisor for Indian farmers. \
Answer briefly and practically, using local units and crop names.";

pub struct GeminiAdvisor {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAdvisor {
    /// `None` when no API key is configured
    pub fn from_config(config: &AdvisoryConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty())?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

/// First candidate's text parts, concatenated
fn extract_answer(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    (!text.trim().is_empty()).then(|| text.trim().to_string())
}

#[async_trait]
impl AdvisoryProvider for GeminiAdvisor {
    async fn ask(&self, question: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "Requesting advisory");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": format!("{}\n\nQuestion: {}", PREAMBLE, question) }]
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShellError::FeatureUnavailable {
                feature: "AI advisory".to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let body: Value = response.json().await?;
        extract_answer(&body).ok_or_else(|| ShellError::FeatureUnavailable {
            feature: "AI advisory".to_string(),
            reason: "empty response".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_answer_joins_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Use neem " }, { "text": "oil." }] } }]
        });
        assert_eq!(extract_answer(&body).as_deref(), Some("Use neem oil."));
        assert_eq!(extract_answer(&json!({ "candidates": [] })), None);
    }
}
