//! PostgreSQL-backed AiAuditRepository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use customflow_core::ai::{
    AiAuditRepository, AiResponseRecord, ConversationMessage, ConversationSession,
    SESSION_TTL_HOURS,
};
use customflow_core::error::Result;
use sqlx::{FromRow, PgPool};

use crate::database::db_error;

#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    active: bool,
}

impl From<SessionRow> for ConversationSession {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            active: row.active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AiAuditRepository for PgAuditRepository {
    async fn record_response(&self, record: AiResponseRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO ai_responses (user_id, input_message, response, tone, has_images, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.user_id)
        .bind(&record.input_message)
        .bind(&record.response)
        .bind(record.tone.as_ref())
        .bind(record.has_images)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| db_error("record ai response", e))
    }

    async fn touch_session(&self, session_id: &str, user_id: i64) -> Result<ConversationSession> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);
        let row: SessionRow = sqlx::query_as(
            "INSERT INTO conversation_sessions (session_id, user_id, created_at, updated_at, expires_at, active) \
             VALUES ($1, $2, $3, $3, $4, TRUE) \
             ON CONFLICT (session_id) DO UPDATE \
             SET updated_at = EXCLUDED.updated_at, expires_at = EXCLUDED.expires_at, active = TRUE \
             RETURNING session_id, user_id, created_at, updated_at, expires_at, active",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("upsert conversation session", e))?;
        Ok(row.into())
    }

    async fn append_message(&self, message: ConversationMessage) -> Result<()> {
        sqlx::query(
            "INSERT INTO conversation_messages (session_id, role, content, timestamp, token_count) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&message.session_id)
        .bind(message.role.as_ref())
        .bind(&message.content)
        .bind(message.timestamp)
        .bind(message.token_count as i32)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| db_error("append conversation message", e))
    }
}
