// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use icebreak::config::loader::{
    CONFIG_ENV, EXEC_WRAPPER_ENV, MARKER_PATH_ENV, READY_TIMEOUT_ENV, READY_TOKEN_ENV,
};
use icebreak::config::load_from_env_with;
use icebreak::errors::BootstrapError;
use icebreak::guard::DEFAULT_MARKER_PATH;
use tempfile::NamedTempFile;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn empty_environment_gives_defaults() {
    init_tracing();

    let cfg = load_from_env_with(None, env(&[])).unwrap();

    assert!(cfg.wrappers.is_none());
    assert_eq!(cfg.marker_path, PathBuf::from(DEFAULT_MARKER_PATH));
    assert!(cfg.readiness.timeout.is_none());
    assert!(cfg.readiness.matcher.is_match("wrapper READY"));
}

#[test]
fn blank_wrapper_variable_counts_as_unset() {
    let cfg = load_from_env_with(None, env(&[(EXEC_WRAPPER_ENV, "  ")])).unwrap();
    assert!(cfg.wrappers.is_none());
}

#[test]
fn environment_overrides_file() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[bootstrap]
marker_path = "/tmp/from-file"
ready_token = "UP"
ready_timeout = "10s"
"#
    )
    .unwrap();
    let path = file.path().display().to_string();

    let cfg = load_from_env_with(
        None,
        env(&[
            (CONFIG_ENV, path.as_str()),
            (READY_TIMEOUT_ENV, "250ms"),
            (EXEC_WRAPPER_ENV, "/opt/a,/opt/b"),
        ]),
    )
    .unwrap();

    assert_eq!(cfg.marker_path, PathBuf::from("/tmp/from-file"));
    assert!(cfg.readiness.matcher.is_match("UP"));
    assert!(!cfg.readiness.matcher.is_match("READY"));
    assert_eq!(cfg.readiness.timeout, Some(Duration::from_millis(250)));
    assert_eq!(cfg.wrappers.as_deref(), Some("/opt/a,/opt/b"));

    let cfg = load_from_env_with(
        Some(file.path()),
        env(&[(MARKER_PATH_ENV, "/tmp/from-env"), (READY_TOKEN_ENV, "GO")]),
    )
    .unwrap();
    assert_eq!(cfg.marker_path, PathBuf::from("/tmp/from-env"));
    assert!(cfg.readiness.matcher.is_match("GO"));
}

#[test]
fn environment_token_overrides_file_pattern() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[bootstrap]\nready_pattern = \"^ok$\"\n").unwrap();

    let from_file = load_from_env_with(Some(file.path()), env(&[])).unwrap();
    assert!(from_file.readiness.matcher.is_match("ok"));

    let cfg = load_from_env_with(Some(file.path()), env(&[(READY_TOKEN_ENV, "GO")])).unwrap();
    assert!(cfg.readiness.matcher.is_match("wrapper GO"));
    assert!(!cfg.readiness.matcher.is_match("ok"));
}

#[test]
fn unknown_key_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[bootstrap]\nready_tokn = \"READY\"\n").unwrap();

    match load_from_env_with(Some(file.path()), env(&[])) {
        Err(BootstrapError::TomlError(_)) => {}
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn bad_timeout_from_environment_is_a_config_error() {
    match load_from_env_with(None, env(&[(READY_TIMEOUT_ENV, "forever")])) {
        Err(BootstrapError::ConfigError(msg)) => assert!(msg.contains("ready_timeout")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_config_file_is_an_io_error() {
    let missing = PathBuf::from("/nonexistent/icebreak.toml");
    match load_from_env_with(Some(missing.as_path()), env(&[])) {
        Err(BootstrapError::IoError(_)) => {}
        other => panic!("expected IoError, got {other:?}"),
    }
}
