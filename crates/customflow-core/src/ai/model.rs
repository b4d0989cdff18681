//! Value types exchanged with the OCR/chat gateway.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::{CustomFlowError, Result};
use crate::outcome::Partitioned;

/// Upper bound accepted for the completion token budget.
pub const MAX_TOKENS_CAP: u32 = 4000;
/// Separator placed between the texts of consecutive images.
pub const IMAGE_TEXT_SEPARATOR: &str = "\n\n---NEXT IMAGE---\n\n";

/// Style of a drafted customer reply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Formal,
    Short,
}

impl Tone {
    /// Missing or blank tones mean `friendly`; anything else must match exactly.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Friendly),
            Some(value) => Self::from_str(value).map_err(|_| {
                CustomFlowError::validation("tone", "must be one of friendly, formal, short")
            }),
        }
    }
}

/// Live sampling parameters used for reply generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiParameters {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for AiParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Partial parameter change requested by an operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl AiParameters {
    /// Applies an update with clamping.
    ///
    /// Temperature is clamped into `[0, 2]` and NaN is ignored. Max tokens is
    /// capped at [`MAX_TOKENS_CAP`] and zero is ignored.
    pub fn apply(&mut self, update: ParameterUpdate) {
        if let Some(t) = update.temperature.filter(|t| !t.is_nan()) {
            self.temperature = t.clamp(0.0, 2.0);
        }
        if let Some(n) = update.max_tokens.filter(|n| *n > 0) {
            self.max_tokens = n.min(MAX_TOKENS_CAP);
        }
    }
}

/// Public description of the configured model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model: String,
    pub provider: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub has_api_key: bool,
    pub vision_ocr: bool,
}

/// Token accounting reported by the completion API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A drafted reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyOutcome {
    pub text: String,
    /// `None` for canned replies and providers that do not report usage.
    pub usage: Option<TokenUsage>,
    /// True when the reply came from the canned table instead of the API.
    pub fallback: bool,
}

/// Joins per-image texts in input order.
///
/// Fails with `NoTextExtracted` when no image produced text.
pub fn join_extracted(outcome: &Partitioned<String>) -> Result<String> {
    if outcome.is_all_failed() {
        return Err(CustomFlowError::NoTextExtracted {
            attempted: outcome.attempted(),
        });
    }
    Ok(outcome.succeeded.join(IMAGE_TEXT_SEPARATOR))
}
