//! Chat completion clients for the support-chat assistant.

mod openai_client;

pub use openai_client::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to model provider failed: {0}")]
    Transport(String),

    #[error("Model provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No configured model is accessible: {0}")]
    NoModelAvailable(String),

    #[error("Model returned an empty reply")]
    EmptyResponse,
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Complete the conversation, returning the assistant's reply text
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Returns a canned reply and records every prompt it receives
    pub struct ScriptedModel {
        pub reply: Result<String, String>,
        pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
    }

    impl ScriptedModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: &str) -> Self {
            Self {
                reply: Err(error.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedModel {
        async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.reply
                .clone()
                .map_err(LlmError::NoModelAvailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_message_serializes_lowercase_role() {
        let value = serde_json::to_value(PromptMessage::assistant("hi")).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "hi");
    }
}
