//! OCR/chat gateway trait.

use std::path::PathBuf;

use super::model::{ModelInfo, ParameterUpdate, ReplyOutcome, Tone};
use crate::error::Result;

/// An abstract client of the external vision/chat completion API.
///
/// Implementations hold the live [`super::AiParameters`] and must let
/// concurrent callers read a consistent snapshot while an update is applied.
#[async_trait::async_trait]
pub trait AiGateway: Send + Sync {
    /// Extracts the text visible in each image and joins the results.
    ///
    /// # Arguments
    ///
    /// * `images` - Files on local disk, in the order their text should appear
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Texts of all images that produced one, in input order
    /// - `Err(CustomFlowError::NoTextExtracted)`: No image produced text
    /// - `Err(CustomFlowError::Config)`: No credential configured
    async fn extract_text(&self, images: &[PathBuf]) -> Result<String>;

    /// Drafts a reply to a customer message in the given tone.
    ///
    /// Without a credential this returns a canned reply and never fails.
    async fn generate_reply(&self, message: &str, tone: Tone) -> Result<ReplyOutcome>;

    async fn model_info(&self) -> ModelInfo;

    /// Applies a clamped parameter change and returns the resulting model info.
    async fn update_parameters(&self, update: ParameterUpdate) -> ModelInfo;
}
