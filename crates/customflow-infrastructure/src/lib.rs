//! Storage and configuration adapters for the CustomFlow backend.

pub mod config_service;
pub mod database;
pub mod fs_image_store;
pub mod memory_audit_repository;
pub mod memory_order_repository;
pub mod pg_audit_repository;
pub mod pg_order_repository;

pub use crate::config_service::ConfigService;
pub use crate::fs_image_store::FsImageStore;
pub use crate::memory_audit_repository::InMemoryAuditRepository;
pub use crate::memory_order_repository::InMemoryOrderRepository;
pub use crate::pg_audit_repository::PgAuditRepository;
pub use crate::pg_order_repository::PgOrderRepository;
