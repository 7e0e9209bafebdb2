//! OpenAI implementation of [`CompletionGateway`]: wraps openai-client, sends [system, user].

use async_trait::async_trait;
use prompt::ChatMessage;
use tracing::{instrument, warn};

use super::{chat_message_to_openai, CompletionGateway, GatewayError};
use crate::config::{LlmConfig, DEFAULT_MODEL};
use crate::CompletionOptions;

/// Gateway backed by openai-client. Without an API key it holds no client and fails closed.
#[derive(Clone)]
pub struct OpenAIGateway {
    client: Option<openai_client::OpenAIClient>,
    model: String,
    options: CompletionOptions,
}

impl OpenAIGateway {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Some(openai_client::OpenAIClient::with_base_url(api_key, base_url)),
            model: DEFAULT_MODEL.to_string(),
            options: CompletionOptions::default(),
        }
    }

    /// Gateway with no credential: every call returns [`GatewayError::MissingCredential`].
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            model: DEFAULT_MODEL.to_string(),
            options: CompletionOptions::default(),
        }
    }

    pub fn from_config(config: &dyn LlmConfig) -> Self {
        let gateway = match config.api_key() {
            Some(key) => Self::with_base_url(key.to_string(), config.base_url().to_string()),
            None => Self::unconfigured(),
        };
        gateway
            .with_model(config.model().to_string())
            .with_options(config.options())
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl CompletionGateway for OpenAIGateway {
    #[instrument(skip(self, system_prompt, user_message), fields(model = %self.model))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, GatewayError> {
        let client = self.client.as_ref().ok_or_else(|| {
            warn!("Completion requested without OPENAI_API_KEY");
            GatewayError::MissingCredential
        })?;

        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(user_message)]
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()?;

        let reply = client
            .chat_completion(&self.model, messages, self.options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                GatewayError::Api(e.to_string())
            })?;

        reply
            .filter(|text| !text.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}
