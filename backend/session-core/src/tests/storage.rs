use crate::error::StorageError;
use crate::storage::file::TOKEN_FILE_NAME;
use crate::storage::paths::DATA_DIR_ENV_VAR;
use crate::storage::{FileTokenStorage, MemoryTokenStorage, PathSource, TokenStorage, detect_data_paths};
use crate::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use std::env;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

#[test]
fn given_memory_storage_when_setting_and_removing_then_get_reflects_changes() {
    let storage = MemoryTokenStorage::new();

    storage.set(ACCESS_TOKEN_KEY, "A1").expect("set");
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).expect("get").as_deref(), Some("A1"));

    storage.remove(ACCESS_TOKEN_KEY).expect("remove");
    storage.remove(ACCESS_TOKEN_KEY).expect("second remove is fine");
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).expect("get"), None);
}

/// **VALUE**: Verifies tokens written by one storage instance are read by the next.
///
/// **WHY THIS MATTERS**: This is the "survives a restart" property: a new process
/// constructs a fresh `FileTokenStorage` over the same directory.
#[test]
fn given_tokens_written_when_reopening_storage_then_tokens_are_read_back() {
    // GIVEN: Tokens written through one instance, in a directory that does not exist yet
    let dir = TempDir::new().expect("temp dir");
    let data_dir = dir.path().join("nested").join("portal");
    let first = FileTokenStorage::new(&data_dir);
    first.set(ACCESS_TOKEN_KEY, "A1").expect("set access");
    first.set(REFRESH_TOKEN_KEY, "R1").expect("set refresh");

    // WHEN: A second instance opens the same directory
    let second = FileTokenStorage::new(&data_dir);

    // THEN: Both tokens are there, and no temp file was left behind
    assert_eq!(second.get(ACCESS_TOKEN_KEY).expect("get").as_deref(), Some("A1"));
    assert_eq!(second.get(REFRESH_TOKEN_KEY).expect("get").as_deref(), Some("R1"));
    assert_eq!(second.path(), data_dir.join(TOKEN_FILE_NAME));
    assert!(!data_dir.join("tokens.json.tmp").exists());
}

#[test]
fn given_one_key_removed_when_reading_then_other_key_survives() {
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());
    storage.set(ACCESS_TOKEN_KEY, "A1").expect("set");
    storage.set(REFRESH_TOKEN_KEY, "R1").expect("set");

    storage.remove(ACCESS_TOKEN_KEY).expect("remove");

    assert_eq!(storage.get(ACCESS_TOKEN_KEY).expect("get"), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY).expect("get").as_deref(), Some("R1"));
}

#[test]
fn given_missing_file_when_removing_then_no_file_is_created() {
    let dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(dir.path());

    storage.remove(ACCESS_TOKEN_KEY).expect("remove");

    assert!(!storage.path().exists());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).expect("get"), None);
}

#[test]
fn given_corrupt_token_file_when_reading_then_returns_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join(TOKEN_FILE_NAME), "[1, 2").expect("write");
    let storage = FileTokenStorage::new(dir.path());

    let result = storage.get(ACCESS_TOKEN_KEY);

    assert!(matches!(result, Err(StorageError::Parse { .. })));
}

#[test]
#[serial]
fn given_data_dir_env_var_when_detecting_paths_then_uses_override() {
    // GIVEN: The override variable set
    // SAFETY: serialized with every other env-mutating test.
    unsafe {
        env::set_var(DATA_DIR_ENV_VAR, "/tmp/portal-test-data");
    }

    // WHEN: Detecting
    let result = detect_data_paths();
    unsafe {
        env::remove_var(DATA_DIR_ENV_VAR);
    }

    // THEN: The override wins
    let paths = result.expect("paths");
    assert_eq!(paths.source, PathSource::EnvVar);
    assert_eq!(paths.data_dir, PathBuf::from("/tmp/portal-test-data"));
    assert_eq!(paths.token_file, PathBuf::from("/tmp/portal-test-data").join(TOKEN_FILE_NAME));
}

#[test]
#[serial]
fn given_blank_data_dir_env_var_when_detecting_paths_then_ignores_it() {
    // SAFETY: serialized with every other env-mutating test.
    unsafe {
        env::set_var(DATA_DIR_ENV_VAR, "   ");
    }

    let result = detect_data_paths();
    unsafe {
        env::remove_var(DATA_DIR_ENV_VAR);
    }

    if let Ok(paths) = result {
        assert_ne!(paths.source, PathSource::EnvVar);
        assert!(paths.data_dir.ends_with("portal"));
    }
}
