// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use yare::parameterized;

#[test]
fn empty_document_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.bus.wildcard, "*");
    assert_eq!(config.bus.error_event, "__error__");
    assert_eq!(config.scheduler.tick_limit, 1000);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [bus]
        error_event = "oops"
        "#,
    )
    .unwrap();
    assert_eq!(config.bus.wildcard, "*");
    assert_eq!(config.bus.error_event, "oops");
    assert_eq!(config.scheduler.tick_limit, 1000);
}

#[parameterized(
    empty_wildcard = { "[bus]\nwildcard = \"\"" },
    empty_error_event = { "[bus]\nerror_event = \"\"" },
    zero_tick_limit = { "[scheduler]\ntick_limit = 0" },
    not_toml = { "[bus" },
)]
fn invalid_configs_are_rejected(text: &str) {
    let err = Config::from_toml_str(text).unwrap_err();
    assert!(matches!(err, ReactiveError::Config(_)));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[scheduler]\ntick_limit = 7").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.scheduler.tick_limit, 7);
}

#[test]
fn load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ReactiveError::Config(msg) if msg.contains("missing.toml")));
}
