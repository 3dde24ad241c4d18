//! Tracing setup for embedding shells and tests.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set and defaults this crate to `info` otherwise.
/// Safe to call more than once; later calls are no-ops, so tests can call
/// it without coordinating.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "great_indian_waffle_app=info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
