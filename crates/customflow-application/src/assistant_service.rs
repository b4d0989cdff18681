//! Assistant Service
//!
//! Wraps the OCR/chat gateway: maps uploaded filenames onto the upload root
//! and keeps the audit trail of drafted replies. Audit writes are best effort
//! and never fail a request.

use chrono::Utc;
use customflow_core::ai::{
    AiAuditRepository, AiGateway, AiResponseRecord, ConversationMessage, ConversationRole,
    ModelInfo, ParameterUpdate, ReplyOutcome, Tone,
};
use customflow_core::auth::Principal;
use customflow_core::error::{CustomFlowError, Result};
use customflow_core::image::ImageStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text extracted from a set of uploaded images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    pub text: String,
    pub image_count: usize,
}

/// A request to draft a customer reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
    pub tone: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub has_images: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyResult {
    pub reply: String,
    pub tone: Tone,
    pub fallback: bool,
}

pub struct AssistantService {
    gateway: Arc<dyn AiGateway>,
    images: Arc<dyn ImageStore>,
    audit: Arc<dyn AiAuditRepository>,
}

impl AssistantService {
    pub fn new(
        gateway: Arc<dyn AiGateway>,
        images: Arc<dyn ImageStore>,
        audit: Arc<dyn AiAuditRepository>,
    ) -> Self {
        Self {
            gateway,
            images,
            audit,
        }
    }

    /// Runs OCR over previously uploaded files.
    ///
    /// Unsafe filenames never reach the gateway; they count as failed attempts.
    pub async fn extract_text(&self, filenames: &[String]) -> Result<OcrResult> {
        if filenames.is_empty() {
            return Err(CustomFlowError::validation(
                "images",
                "at least one image is required",
            ));
        }

        let mut paths = Vec::with_capacity(filenames.len());
        for filename in filenames {
            match self.images.resolve(filename) {
                Some(path) => paths.push(path),
                None => tracing::warn!(%filename, "Rejecting unsafe OCR filename"),
            }
        }
        if paths.is_empty() {
            return Err(CustomFlowError::NoTextExtracted {
                attempted: filenames.len(),
            });
        }

        let rejected = filenames.len() - paths.len();
        let text = self
            .gateway
            .extract_text(&paths)
            .await
            .map_err(|err| match err {
                CustomFlowError::NoTextExtracted { attempted } => {
                    CustomFlowError::NoTextExtracted {
                        attempted: attempted + rejected,
                    }
                }
                other => other,
            })?;

        Ok(OcrResult {
            text,
            image_count: filenames.len(),
        })
    }

    /// Drafts a reply and records it.
    ///
    /// The gateway receives the message as sent; the audit trail stores it
    /// trimmed. With a session id the session is upserted and both sides of
    /// the exchange are appended to it.
    pub async fn generate_reply(
        &self,
        principal: &Principal,
        request: ReplyRequest,
    ) -> Result<ReplyResult> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(CustomFlowError::validation("message", "cannot be empty"));
        }
        let tone = Tone::parse(request.tone.as_deref())?;

        let outcome = self.gateway.generate_reply(&request.message, tone).await?;
        tracing::info!(
            user_id = principal.user_id,
            %tone,
            fallback = outcome.fallback,
            "Reply generated"
        );

        self.record(principal, message, tone, request.has_images, &outcome)
            .await;
        if let Some(session_id) = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            self.append_to_session(principal, session_id, message, &outcome)
                .await;
        }

        Ok(ReplyResult {
            reply: outcome.text,
            tone,
            fallback: outcome.fallback,
        })
    }

    pub async fn model_info(&self) -> ModelInfo {
        self.gateway.model_info().await
    }

    pub async fn update_parameters(&self, update: ParameterUpdate) -> ModelInfo {
        self.gateway.update_parameters(update).await
    }

    async fn record(
        &self,
        principal: &Principal,
        message: &str,
        tone: Tone,
        has_images: bool,
        outcome: &ReplyOutcome,
    ) {
        let record = AiResponseRecord {
            user_id: principal.user_id,
            input_message: message.to_string(),
            response: outcome.text.clone(),
            tone,
            has_images,
            created_at: Utc::now(),
        };
        if let Err(err) = self.audit.record_response(record).await {
            tracing::warn!(error = %err, "Failed to record AI response");
        }
    }

    async fn append_to_session(
        &self,
        principal: &Principal,
        session_id: &str,
        message: &str,
        outcome: &ReplyOutcome,
    ) {
        if let Err(err) = self.audit.touch_session(session_id, principal.user_id).await {
            tracing::warn!(session_id, error = %err, "Failed to upsert conversation session");
            return;
        }

        let usage = outcome.usage.unwrap_or_default();
        let now = Utc::now();
        let messages = [
            (ConversationRole::User, message.to_string(), usage.prompt_tokens),
            (
                ConversationRole::Assistant,
                outcome.text.clone(),
                usage.completion_tokens,
            ),
        ];
        for (role, content, token_count) in messages {
            let entry = ConversationMessage {
                session_id: session_id.to_string(),
                role,
                content,
                timestamp: now,
                token_count,
            };
            if let Err(err) = self.audit.append_message(entry).await {
                tracing::warn!(session_id, %role, error = %err, "Failed to append conversation message");
            }
        }
    }
}
