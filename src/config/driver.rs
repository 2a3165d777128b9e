// src/config/driver.rs

//! `[driver]` settings. Terraform is the only driver.
//!
//! When no backend is configured the Terraform state is stored in Consul,
//! next to the daemon's own KV data, so the backend is derived from the
//! finalized `[consul]` block.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::consul::ConsulConfig;
use crate::config::merge::{merge_block, merge_map, merge_scalar, Merge};
use crate::config::scalar::{default_to, str_value};
use crate::errors::{ConfigError, Result};

/// Terraform backends a task's state can be stored in.
pub const SUPPORTED_BACKENDS: &[&str] = &[
    "azurerm",
    "consul",
    "cos",
    "gcs",
    "kubernetes",
    "local",
    "manta",
    "oss",
    "pg",
    "s3",
];

static TERRAFORM_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("static terraform version regex"));

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    pub terraform: Option<TerraformConfig>,
}

impl DriverConfig {
    /// `consul` must already be finalized.
    pub fn finalize(&mut self, consul: &ConsulConfig) {
        self.terraform
            .get_or_insert_with(TerraformConfig::default)
            .finalize(consul);
    }

    pub fn validate(&self) -> Result<()> {
        match &self.terraform {
            Some(tf) => tf.validate(),
            None => Ok(()),
        }
    }
}

impl Merge for DriverConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            terraform: merge_block(&self.terraform, &other.terraform),
        }
    }
}

/// ```toml
/// [driver.terraform]
/// version = "1.5.7"
/// log = true
///
/// [driver.terraform.backend.s3]
/// bucket = "tf-state"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    pub version: Option<String>,
    pub log: Option<bool>,
    pub persist_log: Option<bool>,
    pub path: Option<String>,

    /// Single entry: backend type to its arguments.
    #[serde(default)]
    pub backend: BTreeMap<String, Value>,

    #[serde(default)]
    pub required_providers: BTreeMap<String, Value>,
}

impl TerraformConfig {
    pub fn backend_type(&self) -> Option<&str> {
        self.backend.keys().next().map(String::as_str)
    }

    pub fn finalize(&mut self, consul: &ConsulConfig) {
        default_to(&mut self.version, String::new());
        default_to(&mut self.log, false);
        default_to(&mut self.persist_log, false);
        default_to(&mut self.path, String::new());

        if self.backend.is_empty() {
            self.backend = consul_backend(consul);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.len() > 1 {
            let types: Vec<&str> = self.backend.keys().map(String::as_str).collect();
            return Err(ConfigError::validation(format!(
                "driver.terraform: only one backend can be configured, found {} ({})",
                types.len(),
                types.join(", ")
            )));
        }
        if let Some(kind) = self.backend_type() {
            if !SUPPORTED_BACKENDS.contains(&kind) {
                return Err(ConfigError::validation(format!(
                    "driver.terraform: unsupported backend {kind:?}, expected one of: {}",
                    SUPPORTED_BACKENDS.join(", ")
                )));
            }
        }

        let version = str_value(&self.version);
        if !version.is_empty() && !TERRAFORM_VERSION.is_match(version) {
            return Err(ConfigError::validation(format!(
                "driver.terraform: version {version:?} must be of the form x.y.z"
            )));
        }
        Ok(())
    }
}

/// Backend storing state in Consul KV under `<kv_path>/terraform`.
fn consul_backend(consul: &ConsulConfig) -> BTreeMap<String, Value> {
    let path = format!("{}/terraform", consul.kv_path().trim_end_matches('/'));

    let mut args = Map::new();
    args.insert("address".into(), json!(consul.address()));
    args.insert("path".into(), json!(path));
    args.insert("gzip".into(), json!(true));

    if let Some(tls) = consul.tls.as_ref().filter(|tls| tls.is_enabled()) {
        args.insert("scheme".into(), json!("https"));
        for (key, value) in [
            ("ca_file", &tls.ca_cert),
            ("cert_file", &tls.cert),
            ("key_file", &tls.key),
        ] {
            let value = str_value(value);
            if !value.is_empty() {
                args.insert(key.into(), json!(value));
            }
        }
    }

    BTreeMap::from([("consul".to_string(), Value::Object(args))])
}

impl Merge for TerraformConfig {
    fn merge(&self, other: &Self) -> Self {
        // A backend is replaced as a whole; mixing arguments of two backend
        // types never yields a usable block.
        let backend = if other.backend.is_empty() {
            self.backend.clone()
        } else {
            other.backend.clone()
        };
        Self {
            version: merge_scalar(&self.version, &other.version),
            log: merge_scalar(&self.log, &other.log),
            persist_log: merge_scalar(&self.persist_log, &other.persist_log),
            path: merge_scalar(&self.path, &other.path),
            backend,
            required_providers: merge_map(&self.required_providers, &other.required_providers),
        }
    }
}
