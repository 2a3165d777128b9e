// src/config/mod.rs

//! Configuration schema, merge, finalize and validation for nia.
//!
//! Responsibilities:
//! - Define the typed configuration tree (`model.rs` and one module per block).
//! - Merge fragments with override semantics (`merge.rs`).
//! - Fill defaults without failing, collecting advisories (`diagnostics.rs`).
//! - Validate block and cross-block invariants (`validate.rs`).
//! - Load fragments from disk (`loader.rs`).

pub mod buffer_period;
pub mod condition;
pub mod consul;
pub mod diagnostics;
pub mod driver;
pub mod loader;
pub mod merge;
pub mod model;
pub mod module_input;
pub mod monitor;
pub mod provider;
pub mod scalar;
pub mod service;
pub mod syslog;
pub mod task;
pub mod tls;
pub mod transport;
pub mod validate;
pub mod vault;

use std::fmt;

pub use buffer_period::BufferPeriodConfig;
pub use condition::ConditionConfig;
pub use consul::ConsulConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use driver::{DriverConfig, TerraformConfig};
pub use loader::{build_config, load_and_validate, load_fragment};
pub use merge::Merge;
pub use model::Config;
pub use module_input::{ModuleInputConfig, ModuleInputConfigs};
pub use monitor::MonitorConfig;
pub use provider::TerraformProviderConfig;
pub use service::ServiceConfig;
pub use task::TaskConfig;
pub use validate::validate_config;
pub use vault::VaultConfig;

/// What debug output prints in place of a credential.
pub const REDACTED: &str = "(redacted)";

/// Debug stand-in for a credential.
pub(crate) struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
