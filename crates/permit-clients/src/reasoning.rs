//! OpenAI-compatible chat completions as a `ReasoningService`
use crate::http::{build_client, check_status, transport, Endpoint};
use async_trait::async_trait;
use permit_core::{ReasoningService, ServiceError, ServiceResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const SERVICE: &str = "reasoning service";

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Value,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Endpoint,
    model: String,
}

impl ChatCompletionsClient {
    /// `endpoint.base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(endpoint: Endpoint, model: impl Into<String>) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(endpoint.timeout)?,
            endpoint,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ReasoningService for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> ServiceResult<String> {
        let api_key = self.endpoint.require_key(SERVICE)?;
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0,
        });

        let response = self
            .client
            .post(self.endpoint.url("chat/completions"))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let body: ChatResponse = check_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport(SERVICE, e))?;

        let choice = body
            .choices
            .first()
            .ok_or_else(|| ServiceError::Decode("response did not include choices".to_string()))?;
        Ok(extract_text(&choice.message.content))
    }
}

/// Message content is either a string or a list of typed parts.
fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}
