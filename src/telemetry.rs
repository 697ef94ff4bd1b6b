//! Diagnostic logging setup.
//!
//! The transcript itself always goes to stdout; tracing output is opt-in and
//! goes to stderr so the two never mix.

use std::io;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the stderr subscriber when `--logs` (or `VOICENOTE_LOGS`) is set.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(enabled: bool) {
    if !enabled {
        return;
    }
    let _ = TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("voicenote=debug"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
