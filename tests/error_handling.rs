// tests/error_handling.rs

mod common;
use crate::common::{init_tracing, write_fragment};

use std::path::PathBuf;

use tempfile::TempDir;

use nia_config::config::{build_config, load_and_validate, load_fragment};
use nia_config::errors::ConfigError;

fn load_one(contents: &str) -> Result<(), ConfigError> {
    let dir = TempDir::new().unwrap();
    let path = write_fragment(dir.path(), "config.toml", contents).unwrap();
    load_and_validate(&[path]).map(|_| ())
}

#[test]
fn unknown_field_is_a_decode_error_naming_the_file() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let path = write_fragment(dir.path(), "typo.toml", "[consul]\nadress = \"x\"\n").unwrap();

    match load_fragment(&path) {
        Err(ConfigError::Decode(msg)) => {
            assert!(msg.contains("typo.toml"), "{msg}");
            assert!(msg.contains("adress"), "{msg}");
        }
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

#[test]
fn condition_with_two_types_fails_decoding() {
    init_tracing();

    let result = load_one(
        r#"
[[task]]
name = "t"
module = "m"

[task.condition.services]
names = ["api"]

[task.condition.consul-kv]
path = "a"
"#,
    );
    match result {
        Err(ConfigError::Decode(msg)) => {
            assert!(msg.contains("exactly one type, found 2"), "{msg}")
        }
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

#[test]
fn two_condition_blocks_fail_decoding() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let path = write_fragment(
        dir.path(),
        "two.json",
        r#"{"task": [{"name": "t", "module": "m",
            "condition": [{"services": {"names": ["a"]}}, {"consul-kv": {"path": "b"}}]}]}"#,
    )
    .unwrap();
    match load_and_validate(&[path]) {
        Err(ConfigError::Decode(msg)) => {
            assert!(msg.contains("exactly one condition block, found 2"), "{msg}")
        }
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

#[test]
fn first_decode_error_stops_the_build() {
    init_tracing();

    let dir = TempDir::new().unwrap();
    let bad = write_fragment(dir.path(), "a.toml", "port = \"not a number\"").unwrap();
    let good = write_fragment(dir.path(), "b.toml", "port = 1").unwrap();

    let err = build_config(&[bad, good]).unwrap_err();
    assert!(err.to_string().contains("a.toml"), "{err}");
}

#[test]
fn missing_path_is_reported() {
    init_tracing();

    let err = build_config(&[PathBuf::from("/definitely/not/here.toml")]).unwrap_err();
    assert!(err.to_string().contains("not/here.toml"), "{err}");
}

#[test]
fn syntax_errors_are_decode_errors() {
    init_tracing();

    assert!(matches!(
        load_one("port = "),
        Err(ConfigError::Decode(_))
    ));
}

#[test]
fn validation_errors_are_structured() {
    init_tracing();

    let cases: &[(&str, &str)] = &[
        (
            "[[task]]\nname = \"1bad\"\nmodule = \"m\"\nservices = [\"a\"]\n",
            "unsupported task name format",
        ),
        (
            "[[task]]\nname = \"t\"\nservices = [\"a\"]\n",
            "module is required",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\n",
            "at least one service or a condition must be configured",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\nservices = [\"a\"]\n\
             [task.condition.services]\nnames = [\"b\"]\n",
            "both the `services` field",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\n[task.condition.catalog-services]\n",
            "catalog-services condition requires",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\nproviders = [\"aws.a\", \"aws.b\"]\n\
             services = [\"a\"]\n",
            "only one provider instance per provider name",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\nservices = [\"a\"]\n\
             [task.buffer_period]\nmin = \"7s\"\nmax = \"5s\"\n",
            "min (7s) cannot be greater than max (5s)",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\n[task.condition.services]\n\
             regexp = \"(\"\n",
            "unable to compile regexp",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\nservices = [\"a\"]\n\
             [task.condition.schedule]\ncron = \"* *\"\n",
            "between 5 and 7 fields",
        ),
        (
            "[[task]]\nname = \"t\"\nmodule = \"m\"\n[task.condition.schedule]\n\
             cron = \"*/5 * * * *\"\n",
            "schedule condition requires",
        ),
        (
            "[driver.terraform]\nversion = \"latest\"\n",
            "must be of the form x.y.z",
        ),
        (
            "[[terraform_provider]]\n[terraform_provider.aws]\n\
             token = '{{ with secret \"aws/creds\" }}{{ .Data.token }}{{ end }}'\n",
            "Vault is not configured",
        ),
    ];

    for (contents, expected) in cases {
        match load_one(contents) {
            Err(ConfigError::Validation(msg)) => {
                assert!(msg.contains(expected), "expected {expected:?} in {msg:?}")
            }
            other => panic!("expected Validation error for {contents:?}, got: {other:?}"),
        }
    }
}
