//! CustomFlow HTTP server: composition root and axum routes.

pub mod app;
pub mod http;

pub use app::{AppState, bootstrap, init_tracing};
pub use http::build_router;
