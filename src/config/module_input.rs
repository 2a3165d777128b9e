// src/config/module_input.rs

//! `module_input` blocks: extra monitored data handed to a task's module.
//!
//! Unlike the condition, a task may carry any number of these, as long as no
//! two monitor blocks of the task watch the same variable type.
//!
//! ```toml
//! [[task.module_input]]
//! [task.module_input.consul-kv]
//! path = "app/config"
//!
//! [[task.module_input]]
//! [task.module_input.intentions]
//! source_services = { names = ["web"] }
//! destination_services = { names = ["api"] }
//! ```
//!
//! The deprecated `source_input` field decodes into the same type.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::condition::ConditionConfig;
use crate::config::merge::{concat, Merge};
use crate::config::monitor::{
    split_typed_block, MonitorConfig, CATALOG_SERVICES, CONSUL_KV, INTENTIONS, SERVICES,
};
use crate::errors::{ConfigError, Result};

const MODULE_INPUT_TYPES: &[&str] = &[SERVICES, CATALOG_SERVICES, CONSUL_KV, INTENTIONS];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInputConfig {
    pub monitor: MonitorConfig,
}

impl ModuleInputConfig {
    pub fn new(monitor: MonitorConfig) -> Self {
        Self { monitor }
    }

    pub fn variable_type(&self) -> &'static str {
        self.monitor.variable_type()
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let (type_name, body) = split_typed_block("module_input", value)?;
        let monitor = MonitorConfig::decode("module_input", &type_name, body, MODULE_INPUT_TYPES)?;
        Ok(Self { monitor })
    }
}

impl Merge for ModuleInputConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            monitor: self.monitor.merge(&other.monitor),
        }
    }
}

/// Ordered list of module inputs for one task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInputConfigs(pub Vec<ModuleInputConfig>);

impl ModuleInputConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: ModuleInputConfig) {
        self.0.push(input);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleInputConfig> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finalize(&mut self) {
        for input in self.0.iter_mut() {
            input.monitor.finalize();
        }
    }

    /// Enforce that every monitor block of a task watches a distinct
    /// variable type, then validate each input.
    ///
    /// `services` is the task's legacy service list, which counts as a
    /// `services` block when non-empty.
    pub fn validate(&mut self, services: &[String], condition: &ConditionConfig) -> Result<()> {
        let mut claimed: BTreeMap<&'static str, String> = BTreeMap::new();
        if !services.is_empty() {
            claimed.insert(SERVICES, "the task `services` field".to_string());
        }
        if !condition.is_none() {
            let kind = condition.variable_type();
            claimed
                .entry(kind)
                .or_insert_with(|| format!("condition {kind:?}"));
        }

        for input in self.0.iter() {
            let kind = input.variable_type();
            if kind.is_empty() {
                return Err(ConfigError::validation(
                    "module_input block must specify a type",
                ));
            }
            if let Some(existing) = claimed.get(kind) {
                return Err(ConfigError::validation(format!(
                    "module_input {kind:?} conflicts with {existing}: both monitor variable \
                     type {kind:?}; only one block per variable type is allowed per task"
                )));
            }
            claimed.insert(kind, format!("module_input {kind:?}"));
        }

        for input in self.0.iter_mut() {
            input.monitor.validate()?;
        }
        Ok(())
    }
}

impl Merge for ModuleInputConfigs {
    fn merge(&self, other: &Self) -> Self {
        Self(concat(&self.0, &other.0))
    }
}

impl<'de> Deserialize<'de> for ModuleInputConfigs {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inputs = match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::Array(blocks) => blocks
                .into_iter()
                .map(ModuleInputConfig::from_value)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(D::Error::custom)?,
            block => vec![ModuleInputConfig::from_value(block).map_err(D::Error::custom)?],
        };
        Ok(Self(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::monitor::{ConsulKvMonitorConfig, ServicesMonitorConfig};
    use serde_json::json;

    fn decode(value: Value) -> std::result::Result<ModuleInputConfigs, String> {
        serde_json::from_value::<ModuleInputConfigs>(value).map_err(|e| e.to_string())
    }

    fn kv(path: &str) -> ModuleInputConfig {
        ModuleInputConfig::new(MonitorConfig::ConsulKv(ConsulKvMonitorConfig {
            path: Some(path.to_string()),
            ..Default::default()
        }))
    }

    fn services(names: &[&str]) -> MonitorConfig {
        MonitorConfig::Services(ServicesMonitorConfig {
            names: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn decodes_list_and_single_block_forms() {
        let inputs = decode(json!([
            {"consul-kv": {"path": "a"}},
            {"services": {"regexp": "^web"}}
        ]))
        .unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.0[0].variable_type(), "consul-kv");
        assert_eq!(inputs.0[1].variable_type(), "services");

        let single = decode(json!({"consul-kv": {"path": "a"}})).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn rejects_schedule_and_multi_type_blocks() {
        let err = decode(json!([{"schedule": {"cron": "@daily"}}])).unwrap_err();
        assert!(err.contains("unsupported module_input type \"schedule\""), "{err}");

        let err = decode(json!([{"consul-kv": {"path": "a"}, "services": {}}])).unwrap_err();
        assert!(err.contains("exactly one type"), "{err}");
    }

    #[test]
    fn merge_concatenates_in_order() {
        let a = ModuleInputConfigs(vec![kv("a")]);
        let b = ModuleInputConfigs(vec![kv("b")]);
        let merged = a.merge(&b);
        assert_eq!(merged.0, vec![kv("a"), kv("b")]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn duplicate_variable_types_are_rejected() {
        let mut inputs = ModuleInputConfigs(vec![kv("a"), kv("b")]);
        let err = inputs
            .validate(&[], &ConditionConfig::default())
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("module_input \"consul-kv\" conflicts with module_input \"consul-kv\""),
            "{err}"
        );
    }

    #[test]
    fn module_input_conflicting_with_condition_is_rejected() {
        let condition = ConditionConfig::new(MonitorConfig::ConsulKv(ConsulKvMonitorConfig {
            path: Some("c".into()),
            ..Default::default()
        }));
        let mut inputs = ModuleInputConfigs(vec![kv("a")]);
        let err = inputs.validate(&[], &condition).unwrap_err();
        assert!(
            err.to_string()
                .contains("module_input \"consul-kv\" conflicts with condition \"consul-kv\""),
            "{err}"
        );
    }

    #[test]
    fn services_module_input_conflicts_with_legacy_services() {
        let mut inputs = ModuleInputConfigs(vec![ModuleInputConfig::new(services(&["api"]))]);
        let err = inputs
            .validate(&["web".to_string()], &ConditionConfig::default())
            .unwrap_err();
        assert!(
            err.to_string().contains("conflicts with the task `services` field"),
            "{err}"
        );
    }

    #[test]
    fn distinct_types_pass() {
        let condition = ConditionConfig::new(services(&["api"]));
        let mut inputs = ModuleInputConfigs(vec![kv("a")]);
        inputs.finalize();
        assert!(inputs.validate(&[], &condition).is_ok());
    }
}
