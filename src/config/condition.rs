// src/config/condition.rs

//! `condition` block: decides *when* a task runs.
//!
//! Decoded from a single-key map naming the monitor kind:
//!
//! ```toml
//! [task.condition.consul-kv]
//! path = "app/config"
//! recurse = true
//! use_as_module_input = false
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::diagnostics::{DiagnosticKind, Diagnostics};
use crate::config::merge::{merge_scalar, Merge};
use crate::config::monitor::{
    split_typed_block, MonitorConfig, CATALOG_SERVICES, CONSUL_KV, SCHEDULE, SERVICES,
};
use crate::errors::Result;

const CONDITION_TYPES: &[&str] = &[SERVICES, CATALOG_SERVICES, CONSUL_KV, SCHEDULE];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionConfig {
    pub monitor: MonitorConfig,

    /// Whether the watched objects are also handed to the module as input.
    /// Only meaningful for services, catalog-services and consul-kv.
    pub use_as_module_input: Option<bool>,

    /// Superseded by `use_as_module_input`.
    pub deprecated_source_includes_var: Option<bool>,
}

impl ConditionConfig {
    pub fn new(monitor: MonitorConfig) -> Self {
        Self {
            monitor,
            ..Default::default()
        }
    }

    pub fn variable_type(&self) -> &'static str {
        self.monitor.variable_type()
    }

    pub fn is_none(&self) -> bool {
        self.monitor.is_none()
    }

    fn supports_module_input(monitor: &MonitorConfig) -> bool {
        matches!(
            monitor,
            MonitorConfig::Services(_) | MonitorConfig::CatalogServices(_) | MonitorConfig::ConsulKv(_)
        )
    }

    /// Effective `use_as_module_input` once finalized.
    pub fn used_as_module_input(&self) -> bool {
        Self::supports_module_input(&self.monitor) && self.use_as_module_input.unwrap_or(true)
    }

    pub fn finalize(&mut self, diags: &mut Diagnostics) {
        self.monitor.finalize();

        if !Self::supports_module_input(&self.monitor) {
            return;
        }

        let kind = self.variable_type();
        if let Some(deprecated) = self.deprecated_source_includes_var.take() {
            diags.warn(
                DiagnosticKind::DeprecatedField,
                format!(
                    "the `source_includes_var` field in condition {kind:?} is deprecated; \
                     use `use_as_module_input` instead"
                ),
            );
            match self.use_as_module_input {
                None => self.use_as_module_input = Some(deprecated),
                Some(current) if current != deprecated => diags.warn(
                    DiagnosticKind::ConflictingDeprecatedField,
                    format!(
                        "condition {kind:?} sets both `use_as_module_input` and \
                         `source_includes_var`; using `use_as_module_input`"
                    ),
                ),
                Some(_) => {}
            }
        }

        if self.use_as_module_input.is_none() {
            self.use_as_module_input = Some(true);
        }
    }

    pub fn validate(&mut self) -> Result<()> {
        self.monitor.validate()
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let value = match value {
            Value::Array(mut blocks) => {
                if blocks.len() != 1 {
                    return Err(format!(
                        "a task must have exactly one condition block, found {}",
                        blocks.len()
                    ));
                }
                blocks.pop().unwrap_or(Value::Null)
            }
            other => other,
        };

        let (type_name, mut body) = split_typed_block("condition", value)?;

        let mut use_as_module_input = None;
        let mut deprecated_source_includes_var = None;
        if matches!(type_name.as_str(), SERVICES | CATALOG_SERVICES | CONSUL_KV) {
            use_as_module_input = take_bool(&mut body, &type_name, "use_as_module_input")?;
            deprecated_source_includes_var =
                take_bool(&mut body, &type_name, "source_includes_var")?;
        }

        let monitor = MonitorConfig::decode("condition", &type_name, body, CONDITION_TYPES)?;
        Ok(Self {
            monitor,
            use_as_module_input,
            deprecated_source_includes_var,
        })
    }
}

fn take_bool(
    body: &mut serde_json::Map<String, Value>,
    type_name: &str,
    field: &str,
) -> std::result::Result<Option<bool>, String> {
    match body.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(format!(
            "condition {type_name:?}: {field} must be a boolean, got {other}"
        )),
    }
}

impl<'de> Deserialize<'de> for ConditionConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ConditionConfig::from_value(value).map_err(D::Error::custom)
    }
}

impl Merge for ConditionConfig {
    /// A block of a different kind replaces this one wholesale.
    fn merge(&self, other: &Self) -> Self {
        if other.is_none() {
            return self.clone();
        }
        if self.is_none() || self.variable_type() != other.variable_type() {
            return other.clone();
        }
        Self {
            monitor: self.monitor.merge(&other.monitor),
            use_as_module_input: merge_scalar(&self.use_as_module_input, &other.use_as_module_input),
            deprecated_source_includes_var: merge_scalar(
                &self.deprecated_source_includes_var,
                &other.deprecated_source_includes_var,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::monitor::ServicesMonitorConfig;
    use serde_json::json;

    fn decode(value: Value) -> std::result::Result<ConditionConfig, String> {
        serde_json::from_value::<ConditionConfig>(value).map_err(|e| e.to_string())
    }

    #[test]
    fn decodes_single_typed_block() {
        let cond = decode(json!({"services": {"names": ["api"], "use_as_module_input": false}}))
            .unwrap();
        assert_eq!(cond.variable_type(), "services");
        assert_eq!(cond.use_as_module_input, Some(false));
        match &cond.monitor {
            MonitorConfig::Services(s) => assert_eq!(s.names, vec!["api"]),
            other => panic!("unexpected monitor {other:?}"),
        }
    }

    #[test]
    fn decodes_list_form_with_exactly_one_block() {
        let cond = decode(json!([{"schedule": [{"cron": "@daily"}]}])).unwrap();
        assert_eq!(cond.variable_type(), "schedule");

        let err = decode(json!([{"schedule": {"cron": "@daily"}}, {"services": {}}])).unwrap_err();
        assert!(err.contains("exactly one condition block, found 2"), "{err}");

        let err = decode(json!([])).unwrap_err();
        assert!(err.contains("exactly one condition block, found 0"), "{err}");
    }

    #[test]
    fn rejects_ambiguous_and_unknown_blocks() {
        let err = decode(json!({"services": {}, "schedule": {}})).unwrap_err();
        assert!(err.contains("exactly one type"), "{err}");

        let err = decode(json!({"intentions": {}})).unwrap_err();
        assert!(err.contains("unsupported condition type \"intentions\""), "{err}");

        let err = decode(json!({"schedule": {"cron": "@daily", "use_as_module_input": true}}))
            .unwrap_err();
        assert!(err.contains("unknown field `use_as_module_input`"), "{err}");
    }

    #[test]
    fn deprecated_source_includes_var_is_reconciled() {
        let mut cond =
            decode(json!({"consul-kv": {"path": "k", "source_includes_var": false}})).unwrap();
        let mut diags = Diagnostics::new();
        cond.finalize(&mut diags);

        assert_eq!(cond.use_as_module_input, Some(false));
        assert_eq!(cond.deprecated_source_includes_var, None);
        assert!(diags.has_kind(DiagnosticKind::DeprecatedField));

        let mut both = decode(json!({
            "consul-kv": {"path": "k", "source_includes_var": false, "use_as_module_input": true}
        }))
        .unwrap();
        let mut diags = Diagnostics::new();
        both.finalize(&mut diags);
        assert_eq!(both.use_as_module_input, Some(true));
        assert!(diags.has_kind(DiagnosticKind::ConflictingDeprecatedField));
    }

    #[test]
    fn merge_replaces_on_kind_change_and_merges_same_kind() {
        let a = ConditionConfig::new(MonitorConfig::Services(ServicesMonitorConfig {
            names: vec!["api".into()],
            ..Default::default()
        }));
        let b = ConditionConfig {
            use_as_module_input: Some(false),
            ..ConditionConfig::new(MonitorConfig::Services(ServicesMonitorConfig {
                names: vec!["web".into()],
                ..Default::default()
            }))
        };
        let merged = a.merge(&b);
        assert_eq!(merged.use_as_module_input, Some(false));
        match &merged.monitor {
            MonitorConfig::Services(s) => assert_eq!(s.names, vec!["api", "web"]),
            other => panic!("unexpected monitor {other:?}"),
        }

        let schedule = decode(json!({"schedule": {"cron": "@hourly"}})).unwrap();
        assert_eq!(a.merge(&schedule), schedule);
        assert_eq!(a.merge(&ConditionConfig::default()), a);
        assert_eq!(ConditionConfig::default().merge(&a), a);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut cond = decode(json!({"catalog-services": {}})).unwrap();
        let mut diags = Diagnostics::new();
        cond.finalize(&mut diags);
        let once = cond.clone();
        cond.finalize(&mut diags);
        assert_eq!(cond, once);
        assert_eq!(cond.use_as_module_input, Some(true));
    }
}
