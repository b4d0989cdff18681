//! Error types for the CustomFlow backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summary of an existing order that blocked a create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingOrder {
    pub id: i64,
    pub order_id: String,
    /// Formatted as `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
    pub status: String,
}

/// A shared error type for the entire CustomFlow backend.
///
/// Every layer (repositories, gateway, services) reports failures through this
/// enum so the HTTP layer can classify them with a single `match`.
#[derive(Error, Debug, Clone, Serialize)]
pub enum CustomFlowError {
    /// Bad input shape, enum value or range
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Duplicate unique key
    #[error("{message}")]
    Conflict {
        message: String,
        existing: Option<ExistingOrder>,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database or transaction failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// External API answered with a non-2xx status or an unusable body
    #[error("Upstream error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// Every OCR attempt failed
    #[error("Could not extract text from any of the {attempted} images")]
    NoTextExtracted { attempted: usize },

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CustomFlowError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            existing: None,
        }
    }

    /// Creates a Conflict error that names the colliding order.
    pub fn conflict_with(message: impl Into<String>, existing: ExistingOrder) -> Self {
        Self::Conflict {
            message: message.into(),
            existing: Some(existing),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Errors whose message may leak internals and must not reach clients verbatim.
    pub fn is_internal_detail(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Upstream { .. }
                | Self::Io { .. }
                | Self::Serialization { .. }
                | Self::Internal(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CustomFlowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CustomFlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CustomFlowError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CustomFlowError>`.
pub type Result<T> = std::result::Result<T, CustomFlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = CustomFlowError::validation("thickness", "must be one of 2mm, 3mm, 5mm, 8mm");
        assert_eq!(
            err.to_string(),
            "Invalid thickness: must be one of 2mm, 3mm, 5mm, 8mm"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_upstream_message_includes_status() {
        let err = CustomFlowError::upstream(Some(429), "rate limited");
        assert_eq!(err.to_string(), "Upstream error (status 429): rate limited");

        let err = CustomFlowError::upstream(None, "connection refused");
        assert_eq!(err.to_string(), "Upstream error: connection refused");
    }

    #[test]
    fn test_internal_detail_classification() {
        assert!(CustomFlowError::storage("deadlock").is_internal_detail());
        assert!(!CustomFlowError::not_found("order", "7").is_internal_detail());
        assert!(!CustomFlowError::conflict("dup").is_internal_detail());
    }
}
