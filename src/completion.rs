// src/completion.rs
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion API response had no message content")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: Option<f32>,
}

/// Prompt text in, free text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError>;
}

// Only the parts of the chat-completions response we read.
#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Debug)]
struct ChatMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("🧠 Completion client ready: {} (timeout {:?})", base_url, timeout);
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Request body; `temperature` is only sent when the prompt variant asks for one.
fn payload(request: &CompletionRequest<'_>) -> Value {
    let mut payload = json!({
        "model": request.model,
        "messages": [{ "role": "user", "content": request.prompt }],
    });
    if let Some(temperature) = request.temperature {
        payload["temperature"] = json!(temperature);
    }
    payload
}

fn into_content(response: ChatCompletionResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CompletionError::EmptyResponse)
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        debug!("🧠 Sending prompt ({} chars) to {}", request.prompt.len(), request.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("🧠 Completion API error {}: {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        into_content(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(temperature: Option<f32>) -> CompletionRequest<'static> {
        CompletionRequest {
            model: "gpt-4o",
            prompt: "Price: 100",
            temperature,
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = OpenAiClient::new(
            "sk-test".to_string(),
            "https://api.openai.com/v1/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_payload_without_temperature() {
        let body = payload(&request(None));

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Price: 100");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_payload_with_temperature() {
        let body = payload(&request(Some(0.2)));
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_content_from_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"decision\":\"stay_out\"}"}},{"index":1,"message":{"role":"assistant","content":"second"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(into_content(parsed).unwrap(), r#"{"decision":"stay_out"}"#);
    }

    #[test]
    fn test_missing_choices_or_content_is_empty_response() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(into_content(parsed), Err(CompletionError::EmptyResponse)));

        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"error":{}}"#).unwrap();
        assert!(matches!(into_content(parsed), Err(CompletionError::EmptyResponse)));

        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert!(matches!(into_content(parsed), Err(CompletionError::EmptyResponse)));
    }
}
