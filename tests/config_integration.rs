//! Integration tests for on-disk configuration and storage locations

use sessionlens_rs::config::{MaskingOption, RecordingOptions};
use std::time::Duration;

#[test]
fn test_options_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.toml");

    let options = RecordingOptions::new()
        .with_buffer_size(25)
        .with_timeout(Duration::from_secs(600))
        .with_masking([MaskingOption::All])
        .with_debug(true);
    options.save(&path).unwrap();

    let loaded = RecordingOptions::load(&path).unwrap();
    assert_eq!(loaded, options);
    assert!(loaded.mask_all_inputs());
}

#[test]
fn test_partial_options_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.toml");
    std::fs::write(&path, "buffer_size = 3\n").unwrap();

    let loaded = RecordingOptions::load(&path).unwrap();
    assert_eq!(loaded.buffer_size, 3);
    assert_eq!(loaded.timeout_ms, RecordingOptions::default().timeout_ms);
    assert_eq!(loaded.collector_url, "https://sessions.userlens.io");
}

#[test]
fn test_missing_options_file_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = RecordingOptions::load_or_default(dir.path().join("absent.toml"));
    assert_eq!(loaded, RecordingOptions::default());
}

#[cfg(target_os = "linux")]
mod data_dir {
    use serial_test::serial;
    use sessionlens_rs::config::{app_data_dir, APP_ID, STORE_FILE};
    use sessionlens_rs::storage::{FileStore, KeyValueStore};

    #[test]
    #[serial]
    fn test_default_store_lives_in_data_dir() {
        let home = tempfile::tempdir().unwrap();
        let previous = std::env::var_os("XDG_DATA_HOME");
        std::env::set_var("XDG_DATA_HOME", home.path());

        let dir = app_data_dir().unwrap();
        assert_eq!(dir, home.path().join(APP_ID));

        let mut store = FileStore::open_default().unwrap();
        store.set("key", "value").unwrap();
        assert_eq!(store.path(), dir.join(STORE_FILE));
        assert!(dir.join(STORE_FILE).exists());

        match previous {
            Some(value) => std::env::set_var("XDG_DATA_HOME", value),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }
    }
}
