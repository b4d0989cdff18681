//! Prompt templates for OCR and reply drafting.
//!
//! Templates are rendered with minijinja so the customer message is inserted
//! verbatim without format-string escaping concerns.

use customflow_core::ai::Tone;
use customflow_core::error::{CustomFlowError, Result};
use minijinja::{Environment, context};

/// Instruction sent with every OCR image.
pub const OCR_PROMPT: &str = "Please extract ALL text from this image. This could be a screenshot of \
customer messages, order details, specifications, or any other text content. Return only the \
extracted text content without any additional commentary, formatting, or explanations. If you see \
table dimensions, customer names, order details, or any specifications, include everything exactly \
as written.";

/// Business context sent as the system message of every reply request.
pub const SYSTEM_PROMPT: &str = r#"You are the customer service assistant of a business that manufactures premium custom table covers.

Your job:
- Answer questions about custom table covers accurately and helpfully
- Stay professional and approachable
- Focus on dimensions, thickness, corner styles, delivery times and customization
- Keep answers short but complete

What the business offers:
- Covers for dining, office and conference tables, cut to measure
- Thicknesses of 2mm, 3mm, 5mm and 8mm; sharp, rounded or custom corners
- Standard delivery within 3-5 business days
- Orders taken through Amazon, WhatsApp, SMS and phone calls
- All measurements are in inches

Make sure the customer knows what to send so the order can be placed."#;

const REPLY_TEMPLATE: &str = r#"Customer message: "{{ message }}"

{% if tone == "formal" -%}
Generate a formal, professional response for business correspondence. Use proper business language while addressing table cover requirements.
{%- elif tone == "short" -%}
Generate a brief, concise response under 50 words. Focus on essential information - dimensions, material, and delivery.
{%- else -%}
Generate a warm, friendly response while remaining professional. Show enthusiasm for helping with custom table cover needs.
{%- endif %}"#;

/// Compiled prompt templates.
pub struct PromptTemplates {
    env: Environment<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("reply", REPLY_TEMPLATE)
            .map_err(|e| CustomFlowError::internal(format!("Invalid reply template: {e}")))?;
        Ok(Self { env })
    }

    /// User prompt for a reply: the quoted customer message plus the tone instruction.
    pub fn reply_prompt(&self, message: &str, tone: Tone) -> Result<String> {
        self.env
            .get_template("reply")
            .and_then(|t| t.render(context! { message => message, tone => tone.as_ref() }))
            .map_err(|e| CustomFlowError::internal(format!("Failed to render reply prompt: {e}")))
    }
}
