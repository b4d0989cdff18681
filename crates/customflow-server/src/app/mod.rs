pub mod bootstrap;
pub mod logging;
pub mod state;

pub use bootstrap::bootstrap;
pub use logging::init_tracing;
pub use state::AppState;
