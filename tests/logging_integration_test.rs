//! Integration tests for logging functionality
//!
//! A process can install one global subscriber, so this file holds a single
//! test that initializes logging.

use sddgen::config::LoggingConfig;
use sddgen::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    tracing::info!(schedule_id = 1, "Logging integration test");
    drop(guard);

    assert!(log_path.exists());
    assert!(log_path.join("sddgen.log").exists());
}
