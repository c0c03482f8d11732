//! Entry-point state machine.
//!
//! One run moves through five stages:
//!
//! ```text
//! Connecting → AvatarStarting → SessionStarting → Active → Terminated
//! ```
//!
//! The two remote start calls are strictly ordered: the avatar must be
//! running before the session starts so it can consume the session's audio
//! output. Each startup stage carries its own typed ready value
//! ([`RoomHandle`] → [`AvatarHandle`] → [`SessionHandle`]) and runs under a
//! finite deadline; a hung provider surfaces as
//! [`AgentError::StageTimeout`] instead of stalling the process silently.
//!
//! `Active` contains no orchestration logic: the external runtime drives the
//! conversation while the agent idles on the room's close signal or a
//! cancellation (Ctrl+C).

use crate::avatar::{AvatarHandle, AvatarRenderer};
use crate::config::StageTimeouts;
use crate::error::{AgentError, Result};
use crate::room::{RoomConnector, RoomHandle};
use crate::session::{AgentSession, SessionHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle stage of one agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Establishing the room connection.
    Connecting,
    /// Waiting for the remote avatar to confirm readiness.
    AvatarStarting,
    /// Waiting for the session's provider handshakes.
    SessionStarting,
    /// Conversation in progress, driven by the external runtime.
    Active,
    /// Room disconnected or process shutting down.
    Terminated,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Connecting => "connecting",
            Stage::AvatarStarting => "avatar-starting",
            Stage::SessionStarting => "session-starting",
            Stage::Active => "active",
            Stage::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Events describing what the agent is doing "right now".
///
/// Emitted on an optional channel for observability; tests use them to
/// assert start ordering.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// The run moved to a new stage.
    StageChanged(Stage),
    /// Room connection established.
    RoomConnected {
        /// Name of the connected room.
        room: String,
    },
    /// The remote avatar confirmed readiness.
    AvatarReady {
        /// Remote conversation identifier.
        conversation_id: String,
    },
    /// All session capabilities acknowledged.
    SessionReady {
        /// Session identifier.
        session_id: Uuid,
    },
    /// The room disconnected.
    RoomClosed,
}

/// The interview agent: one room, one avatar, one session, run once.
pub struct InterviewAgent {
    connector: Box<dyn RoomConnector>,
    avatar: Box<dyn AvatarRenderer>,
    session: AgentSession,
    timeouts: StageTimeouts,
    events: Option<mpsc::UnboundedSender<AgentEvent>>,
    cancel: CancellationToken,
}

impl InterviewAgent {
    /// Compose an agent from its three collaborators.
    pub fn new(
        connector: impl RoomConnector + 'static,
        avatar: impl AvatarRenderer + 'static,
        session: AgentSession,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            connector: Box::new(connector),
            avatar: Box::new(avatar),
            session,
            timeouts,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an event channel (observability / test instrumentation).
    pub fn with_events(mut self, events: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Token that cancels the `Active` stage (e.g. on Ctrl+C).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    async fn run_stage<T>(
        &self,
        stage: Stage,
        deadline: Duration,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.emit(AgentEvent::StageChanged(stage));
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::StageTimeout {
                stage: stage.to_string(),
                timeout_secs: deadline.as_secs(),
            }),
        }
    }

    /// Run the interview to completion.
    ///
    /// Returns once the room disconnects or the agent is cancelled. Any
    /// startup failure aborts the remaining stages and propagates; in
    /// particular a failed avatar start means the session start is never
    /// attempted.
    ///
    /// # Errors
    ///
    /// Connection, avatar, provider, and timeout errors are all fatal.
    pub async fn run(self) -> Result<()> {
        let mut room = self
            .run_stage(
                Stage::Connecting,
                self.timeouts.connect(),
                self.connector.connect(),
            )
            .await?;
        info!("agent joined room: {}", room.name());
        self.emit(AgentEvent::RoomConnected {
            room: room.name().to_owned(),
        });

        let avatar_handle = self
            .run_stage(
                Stage::AvatarStarting,
                self.timeouts.avatar_start(),
                self.avatar.start(&room),
            )
            .await?;
        info!("avatar live: {}", self.avatar.label());
        self.emit(AgentEvent::AvatarReady {
            conversation_id: avatar_handle.conversation_id.clone(),
        });

        let session_handle = self
            .run_stage(
                Stage::SessionStarting,
                self.timeouts.session_start(),
                self.session.start(&room),
            )
            .await?;
        self.emit(AgentEvent::SessionReady {
            session_id: session_handle.id,
        });

        self.emit(AgentEvent::StageChanged(Stage::Active));
        info!("interview active - waiting for the conversation to end");
        tokio::select! {
            () = self.cancel.cancelled() => {
                info!("shutdown requested");
            }
            () = room.wait_closed() => {
                info!("room closed");
                self.emit(AgentEvent::RoomClosed);
            }
        }

        self.emit(AgentEvent::StageChanged(Stage::Terminated));
        self.shutdown(&avatar_handle, &session_handle).await;
        Ok(())
    }

    /// Best-effort teardown; failures are logged, never propagated.
    async fn shutdown(&self, avatar: &AvatarHandle, session: &SessionHandle) {
        if let Err(e) = self.avatar.stop(avatar).await {
            warn!("avatar stop failed: {e}");
        }
        info!("session {} terminated", session.id);
    }
}
