//! OCR and reply drafting domain.
//!
//! - `model`: Tone, live parameters and reply values
//! - `gateway`: Trait implemented by the completion API client
//! - `audit`: Reply records and conversation history

mod audit;
mod gateway;
mod model;

pub use audit::{
    AiAuditRepository, AiResponseRecord, ConversationMessage, ConversationRole,
    ConversationSession, SESSION_TTL_HOURS,
};
pub use gateway::AiGateway;
pub use model::{
    AiParameters, IMAGE_TEXT_SEPARATOR, MAX_TOKENS_CAP, ModelInfo, ParameterUpdate, ReplyOutcome,
    TokenUsage, Tone, join_extracted,
};
