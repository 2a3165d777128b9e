// src/config/provider.rs

//! `[[terraform_provider]]` blocks.
//!
//! Each block is a single-key map from provider name to its arguments:
//!
//! ```toml
//! [[terraform_provider]]
//! [terraform_provider.aws]
//! alias = "east"
//! region = "us-east-1"
//! auto_commit = true
//! task_env = { AWS_ACCESS_KEY_ID = "{{ env \"EAST_KEY\" }}" }
//! ```
//!
//! Arguments are handed to Terraform untouched, except for the meta-arguments
//! `task_env` and `auto_commit`, which are consumed here. Arguments commonly
//! hold credentials, so the debug representation never prints their values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::merge::{merge_map, Merge};
use crate::config::Redacted;
use crate::errors::{ConfigError, Result};

const META_ARGUMENTS: &[&str] = &["task_env", "auto_commit"];

static VAULT_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{-?\s*with\s+secret\b").expect("static vault template regex"));

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TerraformProviderConfig(pub BTreeMap<String, Value>);

/// `"aws.east"` → `"aws"`.
pub fn provider_base_name(id: &str) -> &str {
    id.split_once('.').map_or(id, |(base, _)| base)
}

impl TerraformProviderConfig {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self(BTreeMap::from([(name.into(), arguments)]))
    }

    /// The provider name, when the block is well formed.
    pub fn name(&self) -> Option<&str> {
        match self.0.len() {
            1 => self.0.keys().next().map(String::as_str),
            _ => None,
        }
    }

    fn body(&self) -> Option<&Map<String, Value>> {
        match self.0.values().next()? {
            Value::Object(map) => Some(map),
            Value::Array(items) if items.len() == 1 => items[0].as_object(),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.body()?.get("alias")?.as_str()
    }

    /// `name` or `name.alias`.
    pub fn id(&self) -> String {
        let name = self.name().unwrap_or_default();
        match self.alias() {
            Some(alias) => format!("{name}.{alias}"),
            None => name.to_string(),
        }
    }

    pub fn auto_commit(&self) -> bool {
        self.body()
            .and_then(|b| b.get("auto_commit"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn task_env(&self) -> BTreeMap<String, String> {
        self.body()
            .and_then(|b| b.get("task_env"))
            .and_then(Value::as_object)
            .map(|env| {
                env.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Arguments passed through to Terraform (meta-arguments removed).
    pub fn arguments(&self) -> Map<String, Value> {
        self.body()
            .map(|b| {
                b.iter()
                    .filter(|(k, _)| !META_ARGUMENTS.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True if any argument is templated against Vault secrets.
    pub fn uses_vault(&self) -> bool {
        self.0.values().any(contains_vault_template)
    }

    pub fn validate(&self) -> Result<()> {
        let Some(name) = self.name() else {
            return Err(ConfigError::validation(format!(
                "terraform_provider block must have exactly one provider name, found {}",
                self.0.len()
            )));
        };
        if name.is_empty() {
            return Err(ConfigError::validation(
                "terraform_provider name must not be empty",
            ));
        }
        let Some(body) = self.body() else {
            return Err(ConfigError::validation(format!(
                "terraform_provider {name:?}: arguments must be a map"
            )));
        };

        match body.get("alias") {
            None => {}
            Some(Value::String(alias)) if !alias.is_empty() => {}
            Some(_) => {
                return Err(ConfigError::validation(format!(
                    "terraform_provider {name:?}: alias must be a non-empty string"
                )));
            }
        }
        if body.get("auto_commit").is_some_and(|v| !v.is_boolean()) {
            return Err(ConfigError::validation(format!(
                "terraform_provider {name:?}: auto_commit must be a boolean"
            )));
        }
        if let Some(env) = body.get("task_env") {
            let all_strings = env
                .as_object()
                .is_some_and(|env| env.values().all(Value::is_string));
            if !all_strings {
                return Err(ConfigError::validation(format!(
                    "terraform_provider {name:?}: task_env must be a map of strings"
                )));
            }
        }
        Ok(())
    }
}

fn contains_vault_template(value: &Value) -> bool {
    match value {
        Value::String(s) => VAULT_TEMPLATE.is_match(s),
        Value::Array(items) => items.iter().any(contains_vault_template),
        Value::Object(map) => map.values().any(contains_vault_template),
        _ => false,
    }
}

/// Validate every provider block and the uniqueness of provider IDs.
pub fn validate_providers(providers: &[TerraformProviderConfig]) -> Result<()> {
    let mut ids = BTreeSet::new();
    for provider in providers {
        provider.validate()?;
        let id = provider.id();
        if !ids.insert(id.clone()) {
            return Err(ConfigError::validation(format!(
                "duplicate terraform_provider {id:?}: providers must have a unique name or alias"
            )));
        }
    }
    Ok(())
}

impl Merge for TerraformProviderConfig {
    fn merge(&self, other: &Self) -> Self {
        Self(merge_map(&self.0, &other.0))
    }
}

impl fmt::Debug for TerraformProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.0.keys() {
            map.entry(name, &Redacted);
        }
        map.finish()
    }
}
