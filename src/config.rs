//! Configuration types for the interview agent.
//!
//! All provider parameters are fixed, opaque configuration accepted by the
//! external platforms. Credentials are sourced from the process environment,
//! but always through an explicit string map ([`InterviewConfig::from_env_map`])
//! so tests never have to mutate ambient process state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the OpenAI API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the LiveKit server URL.
pub const ENV_LIVEKIT_URL: &str = "LIVEKIT_URL";
/// Environment variable holding the LiveKit API key.
pub const ENV_LIVEKIT_API_KEY: &str = "LIVEKIT_API_KEY";
/// Environment variable holding the LiveKit API secret.
pub const ENV_LIVEKIT_API_SECRET: &str = "LIVEKIT_API_SECRET";
/// Environment variable holding the Tavus API key.
pub const ENV_TAVUS_API_KEY: &str = "TAVUS_API_KEY";
/// Environment variable holding the Tavus replica identifier.
pub const ENV_TAVUS_REPLICA_ID: &str = "TAVUS_REPLICA_ID";
/// Environment variable holding the Tavus persona identifier.
pub const ENV_TAVUS_PERSONA_ID: &str = "TAVUS_PERSONA_ID";

/// Placeholder value a fresh checkout ships for the replica ID.
///
/// A replica ID equal to this string is treated as unconfigured even though
/// the variable is technically set.
pub const REPLICA_ID_PLACEHOLDER: &str = "YOUR_REPLICA_ID";
/// Placeholder value a fresh checkout ships for the persona ID.
pub const PERSONA_ID_PLACEHOLDER: &str = "YOUR_PERSONA_ID";

/// Top-level configuration for one interview agent process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// OpenAI authentication shared by the STT/LLM/TTS capabilities.
    pub openai: OpenAiAuth,
    /// LiveKit room provisioning settings.
    pub room: RoomConfig,
    /// Speech-to-text settings.
    pub stt: SttConfig,
    /// Language model settings.
    pub llm: LlmConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
    /// Tavus avatar settings.
    pub avatar: AvatarConfig,
    /// Per-stage startup deadlines.
    pub timeouts: StageTimeouts,
}

/// OpenAI API authentication.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiAuth {
    /// API key used for all three speech capabilities.
    pub api_key: String,
    /// Base URL (override for tests / proxies).
    pub base_url: String,
}

impl Default for OpenAiAuth {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".into(),
        }
    }
}

impl fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAuth")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// LiveKit room provisioning configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// LiveKit server URL (e.g. `wss://myproject.livekit.cloud`).
    pub url: String,
    /// LiveKit API key.
    pub api_key: String,
    /// LiveKit API secret.
    pub api_secret: String,
    /// Fixed room name (None = generate `interview-<uuid>` per run).
    pub room_name: Option<String>,
    /// Participant identity the agent joins under.
    pub agent_identity: String,
    /// JWT TTL in seconds for the agent join token.
    pub token_ttl_seconds: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            room_name: None,
            agent_identity: "intervox-agent".into(),
            token_ttl_seconds: 3600,
        }
    }
}

impl fmt::Debug for RoomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("room_name", &self.room_name)
            .field("agent_identity", &self.agent_identity)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Speech-to-text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Transcription model identifier.
    pub model: String,
    /// Spoken language hint (ISO 639-1).
    pub language: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "whisper-1".into(),
            language: "en".into(),
        }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat model identifier.
    pub model: String,
    /// Sampling temperature (0.7 keeps follow-ups varied but on-script).
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".into(),
            temperature: 0.7,
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Synthesis model identifier.
    pub model: String,
    /// Voice identifier.
    pub voice: String,
    /// Playback speed multiplier.
    pub speed: f64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: "tts-1-hd".into(),
            voice: "nova".into(),
            // Slightly below real time for clarity.
            speed: 0.95,
        }
    }
}

/// Tavus avatar configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Tavus API key.
    pub api_key: String,
    /// Pre-trained visual replica identity.
    pub replica_id: String,
    /// Behavioural persona bound to the replica.
    pub persona_id: String,
    /// Display name the avatar joins the room under.
    pub participant_name: String,
    /// Base URL (override for tests).
    pub base_url: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            replica_id: REPLICA_ID_PLACEHOLDER.into(),
            persona_id: PERSONA_ID_PLACEHOLDER.into(),
            participant_name: "AI Interviewer".into(),
            base_url: "https://tavusapi.com".into(),
        }
    }
}

impl fmt::Debug for AvatarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarConfig")
            .field("api_key", &redact(&self.api_key))
            .field("replica_id", &self.replica_id)
            .field("persona_id", &self.persona_id)
            .field("participant_name", &self.participant_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Per-stage startup deadlines, in seconds.
///
/// The underlying platform contracts define no timeouts; a hung avatar or
/// provider would stall the process indefinitely. Finite defaults keep the
/// failure visible instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTimeouts {
    /// Room provisioning deadline.
    pub connect_secs: u64,
    /// Avatar start deadline (covers remote conversation creation).
    pub avatar_start_secs: u64,
    /// Session start deadline (covers all three provider preflights).
    pub session_start_secs: u64,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: 15,
            avatar_start_secs: 60,
            session_start_secs: 30,
        }
    }
}

impl StageTimeouts {
    /// Room provisioning deadline as a [`Duration`].
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Avatar start deadline as a [`Duration`].
    pub fn avatar_start(&self) -> Duration {
        Duration::from_secs(self.avatar_start_secs)
    }

    /// Session start deadline as a [`Duration`].
    pub fn session_start(&self) -> Duration {
        Duration::from_secs(self.session_start_secs)
    }
}

fn redact(s: &str) -> &str {
    if s.is_empty() { "" } else { "[REDACTED]" }
}

impl InterviewConfig {
    /// Build a config from an explicit environment snapshot.
    ///
    /// Starts from [`Default`] and overlays the seven credential/identity
    /// variables. Unset or empty variables leave the default in place, so
    /// the replica/persona fields keep their placeholder sentinels when
    /// unconfigured.
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        config.apply_env(env);
        config
    }

    /// Build a config from the current process environment.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Overlay credential/identity variables from an environment snapshot.
    ///
    /// Useful when a TOML config file supplies the fixed parameters and the
    /// environment supplies only secrets.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        let get = |name: &str| {
            env.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        if let Some(v) = get(ENV_OPENAI_API_KEY) {
            self.openai.api_key = v;
        }
        if let Some(v) = get(ENV_LIVEKIT_URL) {
            self.room.url = v;
        }
        if let Some(v) = get(ENV_LIVEKIT_API_KEY) {
            self.room.api_key = v;
        }
        if let Some(v) = get(ENV_LIVEKIT_API_SECRET) {
            self.room.api_secret = v;
        }
        if let Some(v) = get(ENV_TAVUS_API_KEY) {
            self.avatar.api_key = v;
        }
        if let Some(v) = get(ENV_TAVUS_REPLICA_ID) {
            self.avatar.replica_id = v;
        }
        if let Some(v) = get(ENV_TAVUS_PERSONA_ID) {
            self.avatar.persona_id = v;
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::error::AgentError::Config(format!("invalid config file: {e}")))
    }

    /// Save configuration to a TOML file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AgentError::Config(format!("serialize failed: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file location (`$XDG_CONFIG_HOME/intervox/config.toml`).
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("intervox").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("intervox")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/intervox-config/config.toml")
        }
    }
}
