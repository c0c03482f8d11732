//! Remote avatar bridge.
//!
//! The avatar is a Tavus conversation bound to a (replica, persona) pair.
//! Platform contract: the avatar must be started strictly before the speech
//! session so it is the first consumer of the session's audio output and can
//! render synchronized video. The orchestrator in [`crate::agent`] enforces
//! that ordering; this module only owns the start/stop REST calls.

use crate::config::AvatarConfig;
use crate::error::{AgentError, Result};
use crate::room::RoomHandle;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

/// One active avatar rendering stream.
#[derive(Debug, Clone)]
pub struct AvatarHandle {
    /// Remote conversation identifier (used to stop the stream).
    pub conversation_id: String,
    /// URL of the rendered conversation.
    pub conversation_url: String,
}

/// Remote avatar rendering capability.
#[async_trait]
pub trait AvatarRenderer: Send + Sync {
    /// Short label for logs.
    fn label(&self) -> String;

    /// Start rendering into the given room.
    ///
    /// # Errors
    ///
    /// Fatal on auth rejection or provider failure; no retry.
    async fn start(&self, room: &RoomHandle) -> Result<AvatarHandle>;

    /// Stop the rendering stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote end rejects the stop call.
    async fn stop(&self, handle: &AvatarHandle) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct CreateConversationResponse {
    conversation_id: String,
    conversation_url: String,
    #[serde(default)]
    status: String,
}

/// Tavus-backed avatar renderer.
pub struct TavusAvatar {
    config: AvatarConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for TavusAvatar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavusAvatar")
            .field("replica_id", &self.config.replica_id)
            .field("persona_id", &self.config.persona_id)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl TavusAvatar {
    /// Create a renderer bound to one (replica, persona) identity pair.
    pub fn new(config: AvatarConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> AgentError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 | 403 => AgentError::Avatar(format!("Tavus authentication failed: {message}")),
            _ => AgentError::Avatar(format!("Tavus HTTP {}: {message}", status.as_u16())),
        }
    }
}

/// Extract an error message from a Tavus error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

#[async_trait]
impl AvatarRenderer for TavusAvatar {
    fn label(&self) -> String {
        format!("tavus/{}", self.config.replica_id)
    }

    async fn start(&self, room: &RoomHandle) -> Result<AvatarHandle> {
        let url = format!("{}/v2/conversations", self.config.base_url);
        let body = serde_json::json!({
            "replica_id": self.config.replica_id,
            "persona_id": self.config.persona_id,
            "conversation_name": room.name(),
            "properties": {
                "participant_name": self.config.participant_name,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Avatar(format!("Tavus request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let created: CreateConversationResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Avatar(format!("Tavus response malformed: {e}")))?;

        info!(
            "avatar conversation {} started in room {} (status={})",
            created.conversation_id,
            room.name(),
            created.status
        );

        Ok(AvatarHandle {
            conversation_id: created.conversation_id,
            conversation_url: created.conversation_url,
        })
    }

    async fn stop(&self, handle: &AvatarHandle) -> Result<()> {
        let url = format!(
            "{}/v2/conversations/{}/end",
            self.config.base_url, handle.conversation_id
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AgentError::Avatar(format!("Tavus request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        info!("avatar conversation {} ended", handle.conversation_id);
        Ok(())
    }
}
