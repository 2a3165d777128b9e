// src/config/service.rs

//! Top-level `[[service]]` blocks: per-service query overrides for the
//! legacy task `services` list.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::config::merge::{merge_map, merge_scalar, Merge};
use crate::config::scalar::{default_to, str_value};
use crate::errors::{ConfigError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub datacenter: Option<String>,
    pub description: Option<String>,
    /// Defaults to `name`.
    pub id: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub filter: Option<String>,

    #[serde(default)]
    pub cts_user_defined_meta: BTreeMap<String, String>,
}

impl ServiceConfig {
    pub fn id(&self) -> &str {
        str_value(&self.id)
    }

    pub fn finalize(&mut self) {
        default_to(&mut self.datacenter, String::new());
        default_to(&mut self.description, String::new());
        default_to(&mut self.name, String::new());
        if self.id.is_none() {
            self.id = self.name.clone();
        }
        default_to(&mut self.namespace, String::new());
        default_to(&mut self.filter, String::new());
    }

    pub fn validate(&self) -> Result<()> {
        if str_value(&self.name).is_empty() {
            return Err(ConfigError::validation("service: name is required"));
        }
        Ok(())
    }
}

impl Merge for ServiceConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            datacenter: merge_scalar(&self.datacenter, &other.datacenter),
            description: merge_scalar(&self.description, &other.description),
            id: merge_scalar(&self.id, &other.id),
            name: merge_scalar(&self.name, &other.name),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            filter: merge_scalar(&self.filter, &other.filter),
            cts_user_defined_meta: merge_map(
                &self.cts_user_defined_meta,
                &other.cts_user_defined_meta,
            ),
        }
    }
}

/// Validate every service block and the uniqueness of service IDs.
pub fn validate_services(services: &[ServiceConfig]) -> Result<()> {
    let mut ids = BTreeSet::new();
    for service in services {
        service.validate()?;
        if !ids.insert(service.id()) {
            return Err(ConfigError::validation(format!(
                "duplicate service id {:?}: service ids must be unique",
                service.id()
            )));
        }
    }
    Ok(())
}
