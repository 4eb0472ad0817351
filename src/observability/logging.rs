//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate; the library emits events, binaries install the
//!   subscriber through [`init_logging`]
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global fmt subscriber. A no-op if one is already installed.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("easyhttp={level}")))
        .unwrap_or_else(|_| EnvFilter::new("easyhttp=info"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging subscriber already installed");
    }
}
