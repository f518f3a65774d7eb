// Unit tests for logger initialization
// Tests focus on idempotence and error handling

use crate::logger::{LOG_FILE_NAME, initialize};

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Tests and the binary both initialize logging. If the second
/// call panicked, fern would crash the process trying to install a second global logger.
///
/// **BUG THIS CATCHES**: Would catch removal of the install-once guard.
///
/// **NOTE**: Logger state is process-global, so this is the only test that expects the
/// first call to actually install the logger.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A temporary directory that does not exist yet
    let temp_dir = TempDir::new().expect("temp dir");
    let log_dir = temp_dir.path().join("logs");

    // WHEN: Calling initialize twice
    let result1 = initialize(&log_dir, LevelFilter::Off);
    let result2 = initialize(&log_dir, LevelFilter::Off);

    // THEN: Both return Ok and the log file exists
    assert!(result1.is_ok(), "First initialization should succeed: {result1:?}");
    assert!(result2.is_ok(), "Second initialization should succeed (idempotent)");
    assert!(log_dir.join(LOG_FILE_NAME).exists());
}
