//! Process-local AiAuditRepository implementation.

use async_trait::async_trait;
use chrono::Utc;
use customflow_core::ai::{
    AiAuditRepository, AiResponseRecord, ConversationMessage, ConversationSession,
};
use customflow_core::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct AuditState {
    responses: Vec<AiResponseRecord>,
    sessions: HashMap<String, ConversationSession>,
    messages: Vec<ConversationMessage>,
}

#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    state: RwLock<AuditState>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn responses(&self) -> Vec<AiResponseRecord> {
        self.state.read().await.responses.clone()
    }

    pub async fn session(&self, session_id: &str) -> Option<ConversationSession> {
        self.state.read().await.sessions.get(session_id).cloned()
    }

    /// Messages of one session in append order.
    pub async fn messages(&self, session_id: &str) -> Vec<ConversationMessage> {
        self.state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AiAuditRepository for InMemoryAuditRepository {
    async fn record_response(&self, record: AiResponseRecord) -> Result<()> {
        self.state.write().await.responses.push(record);
        Ok(())
    }

    async fn touch_session(&self, session_id: &str, user_id: i64) -> Result<ConversationSession> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .entry(session_id.to_string())
            .and_modify(|s| s.touch(now))
            .or_insert_with(|| ConversationSession::start(session_id, user_id, now));
        Ok(session.clone())
    }

    async fn append_message(&self, message: ConversationMessage) -> Result<()> {
        self.state.write().await.messages.push(message);
        Ok(())
    }
}
