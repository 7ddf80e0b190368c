//! Tests for photo loading and config file resolution.

#![allow(clippy::unwrap_used, clippy::panic)]

use agelens::AppError;
use agelens::cli::{MAX_IMAGE_FILE_SIZE, load_image};
use agelens::config::AppConfig;
use std::io::Write;
use std::sync::Mutex;
use tempfile::{NamedTempFile, TempDir};

/// AGELENS_CONFIG is process-wide; config tests take turns.
static CONFIG_ENV_MUTEX: Mutex<()> = Mutex::new(());

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

// =============================================================================
// IMAGE LOADING
// =============================================================================

mod load_image_tests {
    use super::*;

    #[test]
    fn magic_bytes_win_over_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "photo.jpg", PNG_HEADER);

        let asset = load_image(&path).unwrap();

        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.file_name(), Some("photo.jpg"));
        assert_eq!(asset.bytes(), PNG_HEADER);
    }

    #[test]
    fn extension_used_when_bytes_unrecognised() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", b"just text");

        let asset = load_image(&path).unwrap();

        assert_eq!(asset.mime_type(), "text/plain");
        assert!(!asset.is_image());
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "blob.zzzunknown", b"\x00\x01\x02");

        let asset = load_image(&path).unwrap();

        assert_eq!(asset.mime_type(), "application/octet-stream");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_image(&dir.path().join("absent.png"));

        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load_image(dir.path());

        assert!(matches!(result, Err(AppError::Io(msg)) if msg.contains("not a regular file")));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_IMAGE_FILE_SIZE + 1).unwrap();

        let result = load_image(file.path());

        assert!(matches!(result, Err(AppError::Io(msg)) if msg.contains("exceeds")));
    }
}

// =============================================================================
// CONFIG FILE RESOLUTION
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn explicit_file_is_loaded() {
        let _guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_model = \"ensemble\"").unwrap();
        writeln!(file, "[prediction]").unwrap();
        writeln!(file, "url = \"http://predict.test/predict/\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.default_model.as_str(), "ensemble");
        // Environment may still override, so only assert when it is unset.
        if std::env::var("AGELENS_PREDICT_URL").is_err() {
            assert_eq!(config.prediction_url, "http://predict.test/predict/");
        }
    }

    #[test]
    fn explicit_missing_file_is_config_error() {
        let _guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();

        let result = AppConfig::load(Some(&dir.path().join("missing.toml")));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("not found")));
    }

    #[test]
    fn env_path_is_used_without_flag() {
        let _guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "agelens.toml", b"default_model = \"hybrid\"\n");

        // SAFETY: Tests touching AGELENS_CONFIG run under CONFIG_ENV_MUTEX.
        unsafe { std::env::set_var("AGELENS_CONFIG", &path) };
        let result = AppConfig::load(None);
        // SAFETY: Tests touching AGELENS_CONFIG run under CONFIG_ENV_MUTEX.
        unsafe { std::env::remove_var("AGELENS_CONFIG") };

        assert_eq!(result.unwrap().default_model.as_str(), "hybrid");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let _guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_model = ").unwrap();

        let result = AppConfig::load(Some(file.path()));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("invalid TOML")));
    }
}
