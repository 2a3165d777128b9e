#![allow(dead_code)]

use std::path::PathBuf;

pub use nia_config_test_utils::{init_tracing, write_fragment};

/// Path to a file or directory under `demos/`.
pub fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}
