//! Sets up application logging.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::Error;

/// The filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "pocket_planner=warn";

/// Install the global tracing subscriber.
///
/// Log lines go to stderr, filtered by `RUST_LOG` (warnings only by default)
/// so that they do not mix with command output on stdout. If `log_file` is
/// given, every event at `debug` level or above is also appended to it.
///
/// # Errors
/// Returns an [Error::IoError] if the log file cannot be opened.
pub fn setup_logging(log_file: Option<&Path>) -> Result<(), Error> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_log)
        .with(debug_log)
        .init();

    Ok(())
}
