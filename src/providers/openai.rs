//! OpenAI-backed speech capabilities.
//!
//! One [`OpenAiClient`] is shared by the three adapters. Starting a
//! capability performs a model-availability preflight against
//! `GET /v1/models/{model}`: a rejected key or unknown model surfaces
//! before the candidate ever joins the room, instead of mid-conversation.
//! The recognition/generation/synthesis loops themselves run inside the
//! external realtime runtime and are not reimplemented here.

use crate::config::{LlmConfig, OpenAiAuth, SttConfig, TtsConfig};
use crate::error::{AgentError, Result};
use crate::providers::{LanguageModel, SpeechSynthesis, SpeechToText};
use async_trait::async_trait;
use tracing::info;

/// Shared OpenAI HTTP client.
#[derive(Clone)]
pub struct OpenAiClient {
    auth: OpenAiAuth,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.auth.base_url)
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client from the shared auth section.
    pub fn new(auth: OpenAiAuth) -> Self {
        Self {
            auth,
            client: reqwest::Client::new(),
        }
    }

    /// Verify that `model` exists and the key is accepted.
    ///
    /// Returns the failure as a plain message; callers wrap it into their
    /// capability's error variant.
    async fn verify_model(&self, model: &str) -> std::result::Result<(), String> {
        let url = format!("{}/v1/models/{model}", self.auth.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.auth.api_key))
            .send()
            .await
            .map_err(|e| format!("OpenAI request failed: {e}"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        Err(match status.as_u16() {
            401 => format!("OpenAI authentication failed: {message}"),
            404 => format!("model {model} unavailable: {message}"),
            code => format!("OpenAI HTTP {code}: {message}"),
        })
    }
}

/// Extract an error message from an OpenAI error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

/// Whisper speech-to-text capability.
#[derive(Debug)]
pub struct OpenAiStt {
    client: OpenAiClient,
    config: SttConfig,
}

impl OpenAiStt {
    /// Create the capability with fixed parameters.
    pub fn new(client: OpenAiClient, config: SttConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SpeechToText for OpenAiStt {
    fn label(&self) -> String {
        format!("openai/{}", self.config.model)
    }

    async fn start(&self) -> Result<()> {
        self.client
            .verify_model(&self.config.model)
            .await
            .map_err(AgentError::Stt)?;
        info!(
            "STT ready: {} (language={})",
            self.label(),
            self.config.language
        );
        Ok(())
    }
}

/// Chat-model language capability carrying the interview instructions.
#[derive(Debug)]
pub struct OpenAiLlm {
    client: OpenAiClient,
    config: LlmConfig,
    instructions: String,
}

impl OpenAiLlm {
    /// Create the capability with fixed parameters and the instruction
    /// document from [`crate::script::render_instructions`].
    pub fn new(client: OpenAiClient, config: LlmConfig, instructions: String) -> Self {
        Self {
            client,
            config,
            instructions,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiLlm {
    fn label(&self) -> String {
        format!("openai/{}", self.config.model)
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    async fn start(&self) -> Result<()> {
        self.client
            .verify_model(&self.config.model)
            .await
            .map_err(AgentError::Llm)?;
        info!(
            "LLM ready: {} (temperature={}, instructions={} chars)",
            self.label(),
            self.config.temperature,
            self.instructions.len()
        );
        Ok(())
    }
}

/// Speech synthesis capability.
#[derive(Debug)]
pub struct OpenAiTts {
    client: OpenAiClient,
    config: TtsConfig,
}

impl OpenAiTts {
    /// Create the capability with fixed parameters.
    pub fn new(client: OpenAiClient, config: TtsConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SpeechSynthesis for OpenAiTts {
    fn label(&self) -> String {
        format!("openai/{}", self.config.model)
    }

    async fn start(&self) -> Result<()> {
        self.client
            .verify_model(&self.config.model)
            .await
            .map_err(AgentError::Tts)?;
        info!(
            "TTS ready: {} (voice={}, speed={})",
            self.label(),
            self.config.voice,
            self.config.speed
        );
        Ok(())
    }
}
