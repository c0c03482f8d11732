//! Error types for the interview agent.

/// Top-level error type for the interview orchestration shell.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Configuration error (missing credentials, bad config file).
    #[error("config error: {0}")]
    Config(String),

    /// Room provisioning or connection error.
    #[error("room error: {0}")]
    Room(String),

    /// Avatar renderer error.
    #[error("avatar error: {0}")]
    Avatar(String),

    /// Speech-to-text provider error.
    #[error("STT error: {0}")]
    Stt(String),

    /// Language model provider error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech provider error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Session composition or startup error.
    #[error("session error: {0}")]
    Session(String),

    /// A startup stage exceeded its configured timeout.
    ///
    /// The platform contracts define no timeout at all, which turns a hung
    /// provider into a silent process stall. Each stage therefore runs under
    /// a finite deadline and surfaces the overrun explicitly.
    #[error("{stage} stage timed out after {timeout_secs}s")]
    StageTimeout {
        /// Name of the startup stage that overran.
        stage: String,
        /// The deadline that was exceeded, in seconds.
        timeout_secs: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AgentError>;
