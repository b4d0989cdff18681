//! Client of the external vision/chat completion API.

pub mod fallback;
pub mod openai_gateway;
pub mod prompts;

pub use openai_gateway::OpenAiGateway;
