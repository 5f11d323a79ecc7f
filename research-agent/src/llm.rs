//! Language-model client
//!
//! Gemini is reached through its OpenAI-compatible endpoint. Failures never
//! escape as panics or errors past [`LanguageModel::complete`]: they are
//! rendered as a human-readable string starting with `Error` so the pipeline
//! can keep going on a best-effort basis.

use std::{sync::Arc, time::Instant};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatChoice, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        FinishReason,
    },
    Client,
};
use async_trait::async_trait;
use research_core::{GenerationConfig, ResearchConfig, ResearchError, ResearchResult};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Model failures, displayed as the text handed back to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("Error: Gemini API Key not configured. Cannot call LLM.")]
    MissingApiKey,

    #[error("Error: The response was blocked by safety filters (Reason: {reason}). Please revise your query or the content gathered.")]
    SafetyBlocked { reason: String },

    #[error("Error: Received an empty response from the language model.")]
    EmptyResponse,

    #[error("Error interacting with the language model: {0}{hint}", hint = api_key_hint(.0))]
    Api(String),
}

fn api_key_hint(detail: &str) -> &'static str {
    if detail.contains("API key not valid") {
        "\nPlease check your GEMINI_API_KEY."
    } else {
        ""
    }
}

/// A text-in, text-out generative model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the completion text
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Like [`generate`](Self::generate), but renders failures as error text
    async fn complete(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Language model call failed: {}", e);
                e.to_string()
            }
        }
    }
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }
}

/// Gemini client over the OpenAI-compatible chat completions API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// `None` when no API key was configured
    client: Option<Client<OpenAIConfig>>,
    model: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    /// Build a client from process configuration
    ///
    /// A missing API key is not an error here: every call re-checks it and
    /// returns [`LlmError::MissingApiKey`].
    pub fn new(config: &ResearchConfig) -> ResearchResult<Self> {
        let client = match &config.gemini_api_key {
            Some(api_key) => {
                let http_client = reqwest::Client::builder()
                    .timeout(config.request_timeout)
                    .build()
                    .map_err(|e| {
                        ResearchError::internal(format!("Failed to create HTTP client: {}", e))
                    })?;

                let openai_config = OpenAIConfig::new()
                    .with_api_base(&config.gemini_api_base)
                    .with_api_key(api_key);

                Some(Client::with_config(openai_config).with_http_client(http_client))
            }
            None => {
                warn!("Gemini API key not configured - model calls will fail until it is set");
                None
            }
        };

        Ok(Self {
            client,
            model: config.gemini_model.clone(),
            generation: config.generation,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let client = self.client.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into()])
            .temperature(self.generation.temperature)
            .top_p(self.generation.top_p)
            .max_tokens(self.generation.max_output_tokens)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let started = Instant::now();
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;
        info!("LLM call took {:.2} seconds", started.elapsed().as_secs_f64());

        let choice = response.choices.first().ok_or(LlmError::EmptyResponse)?;
        interpret_choice(choice)
    }
}

/// Classify a completion choice as text, a safety block or an empty answer
///
/// A refusal always counts as a block. Missing text is a block only when the
/// content filter ended generation.
fn interpret_choice(choice: &ChatChoice) -> Result<String, LlmError> {
    if let Some(refusal) = choice.message.refusal.as_ref().filter(|r| !r.is_empty()) {
        return Err(LlmError::SafetyBlocked {
            reason: refusal.clone(),
        });
    }

    let text = choice
        .message
        .content
        .as_ref()
        .filter(|c| !c.trim().is_empty());

    match (text, choice.finish_reason.as_ref()) {
        (None, Some(FinishReason::ContentFilter)) => Err(LlmError::SafetyBlocked {
            reason: "SAFETY".to_string(),
        }),
        (None, _) => Err(LlmError::EmptyResponse),
        (Some(text), _) => Ok(text.clone()),
    }
}
