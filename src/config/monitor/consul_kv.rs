// src/config/monitor/consul_kv.rs

use serde::Deserialize;

use super::{MonitorBlock, CONSUL_KV};
use crate::config::merge::{merge_scalar, Merge};
use crate::config::scalar::{default_to, str_value};
use crate::errors::{ConfigError, Result};

/// `consul-kv` monitor: watches a single key, or a key prefix when
/// `recurse = true`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsulKvMonitorConfig {
    pub path: Option<String>,
    pub recurse: Option<bool>,
    pub datacenter: Option<String>,
    pub namespace: Option<String>,
}

impl Merge for ConsulKvMonitorConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            path: merge_scalar(&self.path, &other.path),
            recurse: merge_scalar(&self.recurse, &other.recurse),
            datacenter: merge_scalar(&self.datacenter, &other.datacenter),
            namespace: merge_scalar(&self.namespace, &other.namespace),
        }
    }
}

impl MonitorBlock for ConsulKvMonitorConfig {
    const VARIABLE_TYPE: &'static str = CONSUL_KV;

    fn finalize(&mut self) {
        default_to(&mut self.path, String::new());
        default_to(&mut self.recurse, false);
        default_to(&mut self.datacenter, String::new());
        default_to(&mut self.namespace, String::new());
    }

    fn validate(&mut self) -> Result<()> {
        if str_value(&self.path).is_empty() {
            return Err(ConfigError::validation("consul-kv: path is required"));
        }
        Ok(())
    }
}
