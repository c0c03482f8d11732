//! Conversational session assembly.
//!
//! An [`AgentSession`] composes the three provider capabilities with fixed
//! parameters. Starting it binds the session to a room: each capability's
//! handshake runs in turn (STT, LLM, TTS) and any failure propagates
//! unchanged as a fatal startup error. No retry, no partial degradation, no
//! fallback provider selection.

use crate::error::{AgentError, Result};
use crate::providers::{LanguageModel, SpeechSynthesis, SpeechToText};
use crate::room::RoomHandle;
use tracing::info;
use uuid::Uuid;

/// One active conversational loop, owned by the entry point for the
/// duration of the room connection.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Session identifier (logs and events).
    pub id: Uuid,
    /// Name of the room the session is bound to.
    pub room_name: String,
}

/// The composed speech loop: recognition, generation, synthesis.
pub struct AgentSession {
    stt: Box<dyn SpeechToText>,
    llm: Box<dyn LanguageModel>,
    tts: Box<dyn SpeechSynthesis>,
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("stt", &self.stt.label())
            .field("llm", &self.llm.label())
            .field("tts", &self.tts.label())
            .finish()
    }
}

impl AgentSession {
    /// Start building a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Start the session, bound to `room`.
    ///
    /// Capabilities start in a fixed order; the first failure aborts the
    /// remainder and propagates to the caller.
    ///
    /// # Errors
    ///
    /// Returns the provider error of whichever capability handshake failed.
    pub async fn start(&self, room: &RoomHandle) -> Result<SessionHandle> {
        info!(
            "starting session in room {}: stt={} llm={} tts={}",
            room.name(),
            self.stt.label(),
            self.llm.label(),
            self.tts.label()
        );

        self.stt.start().await?;
        self.llm.start().await?;
        self.tts.start().await?;

        let handle = SessionHandle {
            id: Uuid::new_v4(),
            room_name: room.name().to_owned(),
        };
        info!("session {} active in room {}", handle.id, handle.room_name);
        Ok(handle)
    }

    /// The instruction document the language model runs from.
    pub fn instructions(&self) -> &str {
        self.llm.instructions()
    }
}

/// Builder for [`AgentSession`].
#[derive(Default)]
pub struct SessionBuilder {
    stt: Option<Box<dyn SpeechToText>>,
    llm: Option<Box<dyn LanguageModel>>,
    tts: Option<Box<dyn SpeechSynthesis>>,
}

impl SessionBuilder {
    /// Set the speech recognition capability.
    pub fn stt(mut self, stt: impl SpeechToText + 'static) -> Self {
        self.stt = Some(Box::new(stt));
        self
    }

    /// Set the language model capability.
    pub fn llm(mut self, llm: impl LanguageModel + 'static) -> Self {
        self.llm = Some(Box::new(llm));
        self
    }

    /// Set the speech synthesis capability.
    pub fn tts(mut self, tts: impl SpeechSynthesis + 'static) -> Self {
        self.tts = Some(Box::new(tts));
        self
    }

    /// Compose the session.
    ///
    /// # Errors
    ///
    /// Returns a session error naming the first missing capability.
    pub fn build(self) -> Result<AgentSession> {
        Ok(AgentSession {
            stt: self
                .stt
                .ok_or_else(|| AgentError::Session("missing STT capability".into()))?,
            llm: self
                .llm
                .ok_or_else(|| AgentError::Session("missing LLM capability".into()))?,
            tts: self
                .tts
                .ok_or_else(|| AgentError::Session("missing TTS capability".into()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct Recorder(Arc<Mutex<Vec<&'static str>>>);

    struct FakeStt(Recorder, bool);
    struct FakeLlm(Recorder);
    struct FakeTts(Recorder);

    #[async_trait]
    impl SpeechToText for FakeStt {
        fn label(&self) -> String {
            "fake/stt".into()
        }

        async fn start(&self) -> Result<()> {
            self.0.0.lock().unwrap().push("stt");
            if self.1 {
                return Err(AgentError::Stt("handshake refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LanguageModel for FakeLlm {
        fn label(&self) -> String {
            "fake/llm".into()
        }

        fn instructions(&self) -> &str {
            "ask questions"
        }

        async fn start(&self) -> Result<()> {
            self.0.0.lock().unwrap().push("llm");
            Ok(())
        }
    }

    #[async_trait]
    impl SpeechSynthesis for FakeTts {
        fn label(&self) -> String {
            "fake/tts".into()
        }

        async fn start(&self) -> Result<()> {
            self.0.0.lock().unwrap().push("tts");
            Ok(())
        }
    }

    fn session(rec: &Recorder, stt_fails: bool) -> AgentSession {
        AgentSession::builder()
            .stt(FakeStt(rec.clone(), stt_fails))
            .llm(FakeLlm(rec.clone()))
            .tts(FakeTts(rec.clone()))
            .build()
            .expect("complete session")
    }

    #[tokio::test]
    async fn capabilities_start_in_fixed_order() {
        let rec = Recorder(Arc::default());
        let room = RoomHandle::connected("interview-1", "wss://x");
        let handle = session(&rec, false).start(&room).await.expect("start");
        assert_eq!(handle.room_name, "interview-1");
        assert_eq!(*rec.0.lock().unwrap(), vec!["stt", "llm", "tts"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_the_remainder() {
        let rec = Recorder(Arc::default());
        let room = RoomHandle::connected("interview-1", "wss://x");
        let err = session(&rec, true).start(&room).await.unwrap_err();
        assert!(matches!(err, AgentError::Stt(_)));
        assert_eq!(*rec.0.lock().unwrap(), vec!["stt"]);
    }

    #[test]
    fn builder_names_the_missing_capability() {
        let err = AgentSession::builder().build().unwrap_err();
        assert!(matches!(err, AgentError::Session(ref m) if m.contains("STT")));
    }

    #[test]
    fn session_exposes_llm_instructions() {
        let rec = Recorder(Arc::default());
        assert_eq!(session(&rec, false).instructions(), "ask questions");
    }
}
