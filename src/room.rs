//! Room provisioning and the transport connection handle.
//!
//! The agent owns exactly one room connection for its lifetime. Real-time
//! media and signaling stay with the LiveKit runtime; this module only
//! provisions the room server-side, mints the agent's join token, and
//! exposes a close signal the orchestrator can idle on.

use crate::config::RoomConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// Connects the agent to one transport room.
#[async_trait]
pub trait RoomConnector: Send + Sync {
    /// Establish the room connection.
    ///
    /// # Errors
    ///
    /// Connection failures are fatal; the caller performs no retry.
    async fn connect(&self) -> Result<RoomHandle>;
}

/// One active room connection, exclusively owned by the entry point.
pub struct RoomHandle {
    name: String,
    join_url: String,
    closed: watch::Receiver<bool>,
    // Kept alive so a production handle only closes on process shutdown.
    _close_guard: Option<watch::Sender<bool>>,
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("name", &self.name)
            .field("join_url", &self.join_url)
            .field("closed", &*self.closed.borrow())
            .finish()
    }
}

impl RoomHandle {
    /// A handle that stays open until the process ends.
    pub fn connected(name: impl Into<String>, join_url: impl Into<String>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            name: name.into(),
            join_url: join_url.into(),
            closed: rx,
            _close_guard: Some(tx),
        }
    }

    /// A handle plus an external close signal (room disconnect simulation).
    ///
    /// Sending `true` — or dropping the sender — closes the room.
    pub fn with_close_signal(
        name: impl Into<String>,
        join_url: impl Into<String>,
    ) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let handle = Self {
            name: name.into(),
            join_url: join_url.into(),
            closed: rx,
            _close_guard: None,
        };
        (handle, tx)
    }

    /// Room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Server URL participants join through.
    pub fn join_url(&self) -> &str {
        &self.join_url
    }

    /// Suspend until the room disconnects.
    pub async fn wait_closed(&mut self) {
        while !*self.closed.borrow() {
            if self.closed.changed().await.is_err() {
                // Close signal dropped: treat as disconnect.
                break;
            }
        }
    }
}

/// Room connector backed by the LiveKit server API.
///
/// `connect` creates (or reuses) the room and mints the agent's join token.
/// The media-level join is performed by the external realtime runtime using
/// that token.
pub struct LiveKitConnector {
    config: RoomConfig,
}

impl LiveKitConnector {
    /// Create a connector for the given room settings.
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }

    /// Mint the agent's join token for `room_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if JWT signing fails (bad key/secret material).
    pub fn agent_token(&self, room_name: &str) -> Result<String> {
        AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(&self.config.agent_identity)
            .with_name(&self.config.agent_identity)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_owned(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds))
            .to_jwt()
            .map_err(|e| AgentError::Room(format!("join token: {e}")))
    }

    fn room_name(&self) -> String {
        match &self.config.room_name {
            Some(name) => name.clone(),
            None => format!("interview-{}", Uuid::new_v4().simple()),
        }
    }
}

#[async_trait]
impl RoomConnector for LiveKitConnector {
    async fn connect(&self) -> Result<RoomHandle> {
        let room_name = self.room_name();
        let client = RoomClient::with_api_key(
            &self.config.url,
            &self.config.api_key,
            &self.config.api_secret,
        );

        client
            .create_room(&room_name, CreateRoomOptions::default())
            .await
            .map_err(|e| AgentError::Room(format!("create room {room_name}: {e}")))?;

        let token = self.agent_token(&room_name)?;
        info!(
            "room {room_name} provisioned at {} (agent token {} bytes)",
            self.config.url,
            token.len()
        );

        Ok(RoomHandle::connected(room_name, self.config.url.clone()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn close_signal_releases_wait() {
        let (mut handle, close) = RoomHandle::with_close_signal("interview-1", "wss://x");
        close.send(true).expect("receiver alive");
        handle.wait_closed().await;
        assert_eq!(handle.name(), "interview-1");
    }

    #[tokio::test]
    async fn dropped_close_signal_counts_as_disconnect() {
        let (mut handle, close) = RoomHandle::with_close_signal("interview-2", "wss://x");
        drop(close);
        handle.wait_closed().await;
    }

    #[tokio::test]
    async fn connected_handle_stays_open() {
        let mut handle = RoomHandle::connected("interview-3", "wss://x");
        let wait = tokio::time::timeout(Duration::from_millis(50), handle.wait_closed()).await;
        assert!(wait.is_err(), "handle closed unexpectedly");
    }

    #[test]
    fn generated_room_names_are_unique() {
        let connector = LiveKitConnector::new(RoomConfig::default());
        let a = connector.room_name();
        let b = connector.room_name();
        assert!(a.starts_with("interview-"));
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_room_name_is_respected() {
        let connector = LiveKitConnector::new(RoomConfig {
            room_name: Some("interview-fixed".into()),
            ..RoomConfig::default()
        });
        assert_eq!(connector.room_name(), "interview-fixed");
    }

    #[test]
    fn agent_token_is_a_jwt() {
        let connector = LiveKitConnector::new(RoomConfig {
            api_key: "lk-key".into(),
            api_secret: "lk-secret-material-long-enough".into(),
            ..RoomConfig::default()
        });
        let token = connector.agent_token("interview-1").expect("token");
        assert_eq!(token.split('.').count(), 3, "expected header.payload.sig");
    }
}
