//! Provider capability traits for the speech loop.
//!
//! The session composes three capabilities: speech-to-text, language model,
//! and speech synthesis. Each is an opaque external provider reachable only
//! through a narrow configure/start/stop surface, so orchestration never
//! depends on a concrete vendor. [`openai`] supplies the production
//! adapters; tests substitute in-process fakes.

pub mod openai;

use crate::error::Result;
use async_trait::async_trait;

pub use openai::{OpenAiClient, OpenAiLlm, OpenAiStt, OpenAiTts};

/// Speech recognition capability (candidate audio → text).
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Short provider/model label for logs (e.g. `"openai/whisper-1"`).
    fn label(&self) -> String;

    /// Perform the provider handshake.
    ///
    /// # Errors
    ///
    /// Auth rejection or model unavailability is fatal and propagates
    /// unchanged; there is no retry or fallback.
    async fn start(&self) -> Result<()>;

    /// Release the capability. Default: nothing to release.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Language generation capability (conversation brain).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short provider/model label for logs.
    fn label(&self) -> String;

    /// The instruction document driving the conversation.
    fn instructions(&self) -> &str;

    /// Perform the provider handshake.
    ///
    /// # Errors
    ///
    /// Fatal on auth rejection or model unavailability.
    async fn start(&self) -> Result<()>;

    /// Release the capability. Default: nothing to release.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Speech synthesis capability (agent text → audio).
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    /// Short provider/model label for logs.
    fn label(&self) -> String;

    /// Perform the provider handshake.
    ///
    /// # Errors
    ///
    /// Fatal on auth rejection or model unavailability.
    async fn start(&self) -> Result<()>;

    /// Release the capability. Default: nothing to release.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
