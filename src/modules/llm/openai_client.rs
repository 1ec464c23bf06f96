use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatCompletion, LlmError, PromptMessage};
use crate::core::config::LlmConfig;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client with model fallback
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    organization: Option<String>,
    project: Option<String>,
    models: Vec<String>,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Build a client, or `None` when no API key is configured
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Some(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url),
            organization: config.organization.clone(),
            project: config.project.clone(),
            models: config.models.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }))
    }

    async fn complete_with(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, LlmError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model,
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            });

        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project {
            request = request.header("OpenAI-Project", project);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

/// Whether a failed call means this model is unavailable to the account
fn is_model_unavailable(error: &LlmError) -> bool {
    match error {
        LlmError::Api { status, body } => {
            *status == 403 || *status == 404 || body.to_lowercase().contains("model_not_found")
        }
        _ => false,
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
        let mut last_error = String::from("no models configured");

        for model in &self.models {
            match self.complete_with(model, messages).await {
                Ok(reply) => {
                    tracing::debug!(model = %model, "Chat completion succeeded");
                    return Ok(reply);
                }
                Err(e) if is_model_unavailable(&e) => {
                    tracing::warn!(model = %model, "Model unavailable, trying next: {}", e);
                    last_error = format!("({}) -> {}", model, e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::NoModelAvailable(last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(str::to_string),
            base_url: "https://api.openai.com/v1".to_string(),
            organization: None,
            project: None,
            models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
            temperature: 0.6,
            max_tokens: 500,
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_no_key_means_no_client() {
        assert!(OpenAiClient::from_config(&config(None)).unwrap().is_none());
    }

    #[test]
    fn test_client_targets_chat_completions() {
        let client = OpenAiClient::from_config(&config(Some("sk-test")))
            .unwrap()
            .unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.models.len(), 2);
    }

    #[test]
    fn test_model_unavailable_detection() {
        let api = |status: u16, body: &str| LlmError::Api {
            status,
            body: body.to_string(),
        };
        assert!(is_model_unavailable(&api(404, "")));
        assert!(is_model_unavailable(&api(403, "")));
        assert!(is_model_unavailable(&api(
            400,
            r#"{"error":{"code":"model_not_found"}}"#
        )));
        assert!(!is_model_unavailable(&api(401, "invalid api key")));
        assert!(!is_model_unavailable(&api(429, "rate limited")));
        assert!(!is_model_unavailable(&LlmError::Transport("timeout".into())));
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![PromptMessage::system("be nice"), PromptMessage::user("hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: 0.6,
            max_tokens: 500,
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 500);
    }
}
