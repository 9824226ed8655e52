//! Tracing subscriber setup.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::constants::{DEBUG_LOG_FILTER, DEFAULT_LOG_FILTER, LOG_FILE_NAME};

/// Filter to use when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug { DEBUG_LOG_FILTER } else { DEFAULT_LOG_FILTER }
}

/// Install the global subscriber: stderr always, plus a log file when
/// `log_dir` is set. Keep the returned guard alive until exit so buffered
/// file output is flushed.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("logging to {}/{}", dir.display(), LOG_FILE_NAME);
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for debug in [false, true] {
            assert!(EnvFilter::try_new(default_filter(debug)).is_ok());
        }
    }
}
