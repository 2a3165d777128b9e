// src/config/syslog.rs

use serde::Deserialize;

use crate::config::merge::{merge_scalar, Merge};
use crate::config::scalar::default_to;

pub const DEFAULT_SYSLOG_FACILITY: &str = "local0";
pub const DEFAULT_SYSLOG_NAME: &str = "consul-terraform-sync";

/// `[syslog]`: forward the daemon's logs to syslog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyslogConfig {
    pub enabled: Option<bool>,
    pub facility: Option<String>,
    pub name: Option<String>,
}

impl SyslogConfig {
    pub fn finalize(&mut self) {
        default_to(&mut self.enabled, false);
        default_to(&mut self.facility, DEFAULT_SYSLOG_FACILITY.to_string());
        default_to(&mut self.name, DEFAULT_SYSLOG_NAME.to_string());
    }
}

impl Merge for SyslogConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            facility: merge_scalar(&self.facility, &other.facility),
            name: merge_scalar(&self.name, &other.name),
        }
    }
}
