//! Model inference client.
//!
//! Wraps an OpenAI-compatible chat endpoint behind the `ModelClient` trait so
//! the orchestrator, turn generator, and judge can be driven by a scripted
//! fake in tests.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

use crate::error::DebateError;

/// Message role in a model conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message in a model conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Enforce the strict-alternation contract of the inference endpoint.
///
/// Consecutive user messages are collapsed into one (blank-line joined), and
/// a synthetic user greeting is prefixed if the sequence would otherwise open
/// with an assistant message.
pub fn normalize_messages(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut normalized: Vec<ChatMessage> = Vec::new();
    let mut pending_user = String::new();

    for message in messages {
        match message.role {
            Role::User => {
                if !pending_user.is_empty() {
                    pending_user.push_str("\n\n");
                }
                pending_user.push_str(&message.content);
            }
            Role::Assistant => {
                if !pending_user.is_empty() {
                    normalized.push(ChatMessage::user(pending_user.trim().to_string()));
                    pending_user = String::new();
                }
                normalized.push(message);
            }
        }
    }

    if !pending_user.is_empty() {
        normalized.push(ChatMessage::user(pending_user.trim().to_string()));
    }

    if normalized
        .first()
        .map(|m| m.role == Role::Assistant)
        .unwrap_or(false)
    {
        normalized.insert(0, ChatMessage::user("Hello"));
    }

    normalized
}

/// A model inference backend: one blocking request, one text reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(
        &self,
        model_id: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, DebateError>;
}

/// OpenAI-compatible client configured from an API base and key.
pub struct OpenAiModelClient {
    api_base: String,
    api_key: String,
}

impl OpenAiModelClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn invoke(
        &self,
        model_id: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, DebateError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base);
        let client = Client::with_config(config).with_http_client(http_client);

        let request_messages: Vec<ChatCompletionRequestMessage> = normalize_messages(messages)
            .into_iter()
            .map(|m| match m.role {
                Role::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: m.content.into(),
                        name: None,
                    })
                }
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage {
                        content: Some(m.content.into()),
                        name: None,
                        tool_calls: None,
                        refusal: None,
                        audio: None,
                        function_call: None,
                    },
                ),
            })
            .collect();

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .temperature(temperature)
            .max_completion_tokens(max_tokens)
            .messages(request_messages)
            .build()?;

        let response = client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
