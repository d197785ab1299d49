use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "info,tower_http=warn";

pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().with_target(false).json())
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).init(),
    }
}

/// Quiet by default; `TEST_LOG` (or `RUST_LOG`) turns output on. Safe to call
/// from every test.
#[cfg(test)]
pub fn init_test_tracing() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .without_time()
        .try_init();
}
