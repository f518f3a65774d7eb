//! Platform-aware detection of the portal data directory.
//!
//! Lookup order:
//! 1. PORTAL_DATA_DIR environment variable (explicit override)
//! 2. Platform-specific data directory via `dirs` crate
//! 3. `$HOME/.local/share/portal` fallback on Unix
//!
//! Returns Result, never silently falls back to wrong path.

use crate::error::StorageError;
use crate::storage::file::TOKEN_FILE_NAME;

use common::ErrorLocation;

use std::env;
use std::panic::Location;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const DATA_DIR_ENV_VAR: &str = "PORTAL_DATA_DIR";
const APP_DIR_NAME: &str = "portal";

/// Portal data directory detection result.
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Base data directory (e.g., ~/.local/share/portal on Linux).
    pub data_dir: PathBuf,
    /// Path to tokens.json.
    pub token_file: PathBuf,
    /// How the path was determined.
    pub source: PathSource,
}

/// How the path was determined (for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    EnvVar,
    PlatformDefault,
    HomeFallback,
}

impl std::fmt::Display for PathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSource::EnvVar => write!(f, "{DATA_DIR_ENV_VAR}"),
            PathSource::PlatformDefault => write!(f, "platform default"),
            PathSource::HomeFallback => write!(f, "home fallback"),
        }
    }
}

impl DataPaths {
    fn at(data_dir: PathBuf, source: PathSource) -> Self {
        let token_file = data_dir.join(TOKEN_FILE_NAME);
        Self {
            data_dir,
            token_file,
            source,
        }
    }
}

/// Detect where tokens and logs should live.
///
/// # Errors
/// Returns [`StorageError::PathDetection`] if no valid path can be determined.
pub fn detect_data_paths() -> Result<DataPaths, StorageError> {
    if let Ok(custom_dir) = env::var(DATA_DIR_ENV_VAR) {
        if !custom_dir.trim().is_empty() {
            let paths = DataPaths::at(PathBuf::from(&custom_dir), PathSource::EnvVar);
            info!("Using {DATA_DIR_ENV_VAR} override: {:?}", paths.data_dir);
            return Ok(paths);
        }
        warn!("{DATA_DIR_ENV_VAR} is set but empty, ignoring");
    }

    if let Some(data_dir) = dirs::data_dir() {
        let paths = DataPaths::at(data_dir.join(APP_DIR_NAME), PathSource::PlatformDefault);
        debug!("Platform data dir: {:?}", paths.data_dir);
        return Ok(paths);
    }

    #[cfg(unix)]
    {
        if let Ok(home) = env::var("HOME") {
            let paths = DataPaths::at(
                PathBuf::from(home).join(".local/share").join(APP_DIR_NAME),
                PathSource::HomeFallback,
            );
            warn!("Using home fallback path: {:?}", paths.data_dir);
            return Ok(paths);
        }
    }

    Err(StorageError::PathDetection {
        message: format!(
            "Cannot determine portal data directory. Set {DATA_DIR_ENV_VAR} environment variable."
        ),
        location: ErrorLocation::from(Location::caller()),
    })
}
