//! Tracing setup for the terminal binary.
//!
//! The TUI owns the terminal, so logs only ever go to a file. Without a log
//! file no subscriber is installed and the `tracing` macros stay inert.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Filter level for a `-v` count (0=warn, 1=info, 2=debug, 3+=trace).
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a file-backed subscriber. `RUST_LOG` overrides the verbosity.
///
/// Returns `Ok(false)` when `log_file` is `None` and nothing was installed.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hardtype={}", level_for(verbosity))));

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_file(verbosity >= 2)
                .with_line_number(verbosity >= 2),
        )
        .try_init()
        .map_err(|e| Error::Logging {
            message: e.to_string(),
        })?;

    tracing::info!(path = %path.display(), "logging initialised");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_mapping() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(3), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(!init_logging(3, None).unwrap());
    }

    // A global subscriber can only be set once per process, so the file path
    // is exercised by the binary rather than here.
}
