//! LLM configuration: trait and env-based implementation.

use std::env;

use crate::CompletionOptions;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    /// `None` when no credential is configured; the gateway then fails closed.
    fn api_key(&self) -> Option<&str>;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn options(&self) -> CompletionOptions;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    pub options: CompletionOptions,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }
    fn base_url(&self) -> &str {
        &self.openai_base_url
    }
    fn model(&self) -> &str {
        &self.llm_model
    }
    fn options(&self) -> CompletionOptions {
        self.options
    }
}

impl EnvLlmConfig {
    /// Load from environment variables. A missing or blank `OPENAI_API_KEY` is not an error here.
    pub fn from_env() -> Self {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let llm_model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            openai_api_key,
            openai_base_url,
            llm_model,
            options: CompletionOptions::default(),
        }
    }
}
