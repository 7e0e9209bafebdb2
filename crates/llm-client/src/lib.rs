//! # Completion gateway
//!
//! Defines the [`CompletionGateway`] trait (system prompt + user message in, reply text or
//! [`GatewayError`] out) and its OpenAI implementation. One request per call: no retries,
//! no streaming. Callers render the error text in place of the reply.

use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};
use thiserror::Error;

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use openai_client::CompletionOptions;
pub use openai_llm::OpenAIGateway;

/// Failure of a single completion call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No API credential configured; raised before any network I/O.
    #[error("OpenAI API key not found. Please set OPENAI_API_KEY in your environment variables.")]
    MissingCredential,

    /// Network, auth, quota or request-building failure reported by the API client.
    #[error("{0}")]
    Api(String),

    /// The API answered without any reply text.
    #[error("No response from the completion API")]
    EmptyResponse,
}

/// Sends one system prompt and the latest user message to a language model.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str)
        -> Result<String, GatewayError>;
}

/// Text shown in place of a reply when the call failed.
pub fn error_reply(err: &GatewayError) -> String {
    format!("Error: {}", err)
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, GatewayError> {
    let content = msg.content.clone();
    let built: Result<ChatCompletionRequestMessage, _> = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map(Into::into),
    };
    built.map_err(|e| GatewayError::Api(e.to_string()))
}
