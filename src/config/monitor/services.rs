// src/config/monitor/services.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{compile_regexp, validate_names, MonitorBlock, SERVICES};
use crate::config::merge::{concat, merge_map, merge_scalar, Merge};
use crate::config::scalar::default_to;
use crate::errors::{ConfigError, Result};

/// `services` monitor: watches service instances selected either by a
/// regexp over service names or by an explicit list of names.
///
/// ```toml
/// [task.condition.services]
/// regexp = "^web.*"
/// datacenter = "dc1"
/// filter = "Service.Tags contains \"prod\""
/// ```
///
/// `regexp` is never defaulted: `None` means "select by `names`", while
/// `Some("")` is an explicit empty pattern.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesMonitorConfig {
    pub regexp: Option<String>,

    #[serde(default)]
    pub names: Vec<String>,

    pub datacenter: Option<String>,
    pub namespace: Option<String>,
    pub filter: Option<String>,

    /// Arbitrary metadata handed through to the module's service variables.
    #[serde(default)]
    pub cts_user_defined_meta: BTreeMap<String, String>,
}

impl Merge for ServicesMonitorConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            regexp: merge_scalar(&self.regexp, &other.regexp),
            names: concat(&self.names, &other.names),
            datacenter: merge_scalar(&self.datacenter, &other.datacenter),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            filter: merge_scalar(&self.filter, &other.filter),
            cts_user_defined_meta: merge_map(
                &self.cts_user_defined_meta,
                &other.cts_user_defined_meta,
            ),
        }
    }
}

impl MonitorBlock for ServicesMonitorConfig {
    const VARIABLE_TYPE: &'static str = SERVICES;

    fn finalize(&mut self) {
        default_to(&mut self.datacenter, String::new());
        default_to(&mut self.namespace, String::new());
        default_to(&mut self.filter, String::new());
    }

    fn validate(&mut self) -> Result<()> {
        let has_names = !self.names.is_empty();
        match (&self.regexp, has_names) {
            (Some(_), true) => {
                return Err(ConfigError::validation(
                    "services: regexp and names fields cannot both be configured; \
                     include the names in the regexp or split them into separate tasks",
                ));
            }
            (None, false) => {
                return Err(ConfigError::validation(
                    "services: either the regexp or names field must be configured",
                ));
            }
            _ => {}
        }

        if let Some(pattern) = &self.regexp {
            compile_regexp(SERVICES, "regexp", pattern)?;
        }
        validate_names(SERVICES, "names", &self.names)
    }
}
