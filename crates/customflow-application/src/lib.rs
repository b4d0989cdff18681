//! Application layer for CustomFlow.
//!
//! This crate provides the use cases that coordinate the domain rules in
//! `customflow-core` with whichever repositories and gateway the composition
//! root injects.

pub mod assistant_service;
pub mod order_service;

pub use assistant_service::{AssistantService, OcrResult, ReplyRequest, ReplyResult};
pub use order_service::{ListOrdersQuery, OrderService};
