//! Tracing setup shared by slimcheck binaries.
//!
//! One `init_tracing` call at startup wires the global subscriber. The
//! default level comes from the caller (CLI verbosity flags); `RUST_LOG`
//! takes precedence when set. Repeated calls are no-ops since a process
//! can only install one global subscriber.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// With `json` set, log lines come out as newline-delimited JSON for log
/// aggregation; otherwise a compact human format is used.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).compact())
            .try_init()
            .ok();
    }
}
