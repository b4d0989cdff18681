use customflow_core::config::RunMode;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` selects the filter (default `info`). Debug mode prints compact
/// text, release mode prints JSON lines.
pub fn init_tracing(mode: RunMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match mode {
        RunMode::Debug => builder.compact().try_init(),
        RunMode::Release => builder.json().try_init(),
    };
    if let Err(err) = result {
        eprintln!("Tracing subscriber already installed: {err}");
    }
}
