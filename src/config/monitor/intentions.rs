// src/config/monitor/intentions.rs

use serde::Deserialize;

use super::{compile_regexp, validate_names, MonitorBlock, INTENTIONS};
use crate::config::merge::{concat, merge_block, merge_scalar, Merge};
use crate::config::scalar::default_to;
use crate::errors::{ConfigError, Result};

/// `intentions` monitor: watches service intentions between a set of
/// source services and a set of destination services.
///
/// ```toml
/// [[task.module_input]]
/// [task.module_input.intentions]
/// datacenter = "dc1"
/// source_services = { regexp = "^web" }
/// destination_services = { names = ["api", "db"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentionsMonitorConfig {
    pub datacenter: Option<String>,
    pub namespace: Option<String>,
    pub source_services: Option<IntentionsServicesConfig>,
    pub destination_services: Option<IntentionsServicesConfig>,
}

/// One side of an intention: services picked by regexp or by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentionsServicesConfig {
    pub regexp: Option<String>,

    #[serde(default)]
    pub names: Vec<String>,
}

impl Merge for IntentionsServicesConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            regexp: merge_scalar(&self.regexp, &other.regexp),
            names: concat(&self.names, &other.names),
        }
    }
}

impl IntentionsServicesConfig {
    fn validate(&self, side: &str) -> Result<()> {
        match (&self.regexp, self.names.is_empty()) {
            (Some(_), false) => {
                return Err(ConfigError::validation(format!(
                    "intentions: {side} regexp and names fields cannot both be configured"
                )));
            }
            (None, true) => {
                return Err(ConfigError::validation(format!(
                    "intentions: {side} requires either the regexp or names field"
                )));
            }
            _ => {}
        }

        if let Some(pattern) = &self.regexp {
            compile_regexp(INTENTIONS, &format!("{side} regexp"), pattern)?;
        }
        validate_names(INTENTIONS, &format!("{side} names"), &self.names)
    }
}

impl Merge for IntentionsMonitorConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            datacenter: merge_scalar(&self.datacenter, &other.datacenter),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            source_services: merge_block(&self.source_services, &other.source_services),
            destination_services: merge_block(
                &self.destination_services,
                &other.destination_services,
            ),
        }
    }
}

impl MonitorBlock for IntentionsMonitorConfig {
    const VARIABLE_TYPE: &'static str = INTENTIONS;

    fn finalize(&mut self) {
        default_to(&mut self.datacenter, String::new());
        default_to(&mut self.namespace, String::new());
    }

    fn validate(&mut self) -> Result<()> {
        let Some(source) = &self.source_services else {
            return Err(ConfigError::validation(
                "intentions: source_services block is required",
            ));
        };
        let Some(destination) = &self.destination_services else {
            return Err(ConfigError::validation(
                "intentions: destination_services block is required",
            ));
        };

        source.validate("source_services")?;
        destination.validate("destination_services")
    }
}
