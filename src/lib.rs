//! Intervox: voice AI interview agent.
//!
//! This crate orchestrates one conversational interview session:
//! LiveKit room → Tavus avatar → OpenAI speech loop (STT/LLM/TTS)
//!
//! # Architecture
//!
//! The agent is a thin orchestration shell over external platforms:
//! - **Room**: provisioned through the LiveKit server API; real-time media
//!   transport stays with the LiveKit runtime
//! - **Avatar**: a Tavus conversation bound to a (replica, persona) pair,
//!   started strictly before the speech session so it can consume the
//!   session's audio output for lip-synced video
//! - **Session**: three provider capabilities (speech-to-text, language
//!   model, speech synthesis) composed with fixed parameters and a static
//!   interview script
//!
//! Provider internals (recognition, generation, synthesis, rendering) are
//! opaque; this crate only configures them, orders their startup, and
//! watches the room lifecycle.

pub mod agent;
pub mod avatar;
pub mod config;
pub mod doctor;
pub mod error;
pub mod providers;
pub mod room;
pub mod script;
pub mod session;

pub use agent::{AgentEvent, InterviewAgent, Stage};
pub use avatar::{AvatarHandle, AvatarRenderer, TavusAvatar};
pub use config::InterviewConfig;
pub use doctor::{EnvReport, check_environment};
pub use error::{AgentError, Result};
pub use room::{LiveKitConnector, RoomConnector, RoomHandle};
pub use script::{InterviewScript, PersonaConfig, render_instructions};
pub use session::{AgentSession, SessionHandle};
