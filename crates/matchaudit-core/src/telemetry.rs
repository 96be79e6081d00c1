//! Log output for the `matchaudit` binary.
//!
//! Diagnostics are written to stderr. Stdout carries only the report, so it
//! can be redirected into a file or piped into `jq` when `--json` is set.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `json`, each event becomes
/// one JSON object per line. A subscriber installed earlier (e.g. by a test
/// harness) is left in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let json_layer = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
