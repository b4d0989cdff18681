//! Audit trail of generated replies and conversation history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::model::Tone;
use crate::error::Result;

/// Lifetime of a conversation session after its last message.
pub const SESSION_TTL_HOURS: i64 = 24;

/// One generated reply, kept for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponseRecord {
    pub user_id: i64,
    pub input_message: String,
    pub response: String,
    pub tone: Tone,
    pub has_images: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

impl ConversationSession {
    pub fn start(session_id: impl Into<String>, user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
            active: true,
        }
    }

    /// Moves `updated_at` and the expiry forward.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.expires_at = now + Duration::hours(SESSION_TTL_HOURS);
        self.active = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub session_id: String,
    pub role: ConversationRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub token_count: u32,
}

/// Append-only store for the audit trail.
#[async_trait::async_trait]
pub trait AiAuditRepository: Send + Sync {
    async fn record_response(&self, record: AiResponseRecord) -> Result<()>;

    /// Creates the session or bumps its timestamps if it already exists.
    async fn touch_session(&self, session_id: &str, user_id: i64) -> Result<ConversationSession>;

    async fn append_message(&self, message: ConversationMessage) -> Result<()>;
}
