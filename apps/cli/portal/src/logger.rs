//! Logging for the `portal` command-line client.
//!
//! Two sinks: a terse colored stream on stderr that stays out of the way of
//! command output, and a detailed file in the data directory. Installing is
//! idempotent; only the first call does anything.

use crate::error::PortalError;

use common::ErrorLocation;

use std::io::stderr;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339_seconds;
use log::{LevelFilter, debug, info};

pub const LOG_FILE_NAME: &str = "portal.log";

/// Set by the first call to [`initialize`], whether or not it succeeded.
static INSTALLED: AtomicBool = AtomicBool::new(false);

#[cfg(debug_assertions)]
const FILE_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const FILE_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger: `console_level` and above on stderr, and
/// [`FILE_LEVEL`] and above in `{log_dir}/portal.log`.
///
/// # Errors
///
/// [`PortalError::Portal`] if the directory or file cannot be created, or if
/// another global logger is already installed.
pub fn initialize(log_dir: &Path, console_level: LevelFilter) -> Result<(), PortalError> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        debug!("Logging already set up, keeping the existing sinks");
        return Ok(());
    }

    let file = file_sink(log_dir)?;

    Dispatch::new()
        .level(FILE_LEVEL.max(console_level))
        .chain(console_sink(console_level))
        .chain(file)
        .apply()
        .map_err(|e| PortalError::Portal {
            message: format!("Failed to install logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(
        "Logging to {} at {FILE_LEVEL:?}",
        log_dir.join(LOG_FILE_NAME).display()
    );
    Ok(())
}

fn console_sink(level: LevelFilter) -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Magenta)
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red);

    Dispatch::new()
        .level(level)
        .format(move |out, message, record| {
            out.finish(format_args!("{:>5} {message}", colors.color(record.level())))
        })
        .chain(stderr())
}

#[track_caller]
fn file_sink(log_dir: &Path) -> Result<Dispatch, PortalError> {
    std::fs::create_dir_all(log_dir).map_err(|e| PortalError::Portal {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    let file = fern::log_file(&path).map_err(|e| PortalError::Portal {
        message: format!("Failed to open {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(Dispatch::new()
        .level(FILE_LEVEL)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {}: {message}",
                format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
            ))
        })
        .chain(file))
}
