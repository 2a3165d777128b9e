// src/config/monitor/schedule.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{MonitorBlock, SCHEDULE};
use crate::config::merge::{merge_scalar, Merge};
use crate::config::scalar::{default_to, str_value};
use crate::errors::{ConfigError, Result};

const CRON_DESCRIPTORS: &[&str] = &[
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

static CRON_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z*/,?LW#-]+$").expect("static cron field regex"));

/// `schedule` condition: runs the task on a cron schedule instead of on
/// Consul changes.
///
/// Accepts 5 to 7 space separated fields (optional seconds and year) or one
/// of the `@daily`-style descriptors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleMonitorConfig {
    pub cron: Option<String>,
}

impl Merge for ScheduleMonitorConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            cron: merge_scalar(&self.cron, &other.cron),
        }
    }
}

impl MonitorBlock for ScheduleMonitorConfig {
    const VARIABLE_TYPE: &'static str = SCHEDULE;

    fn finalize(&mut self) {
        default_to(&mut self.cron, String::new());
    }

    fn validate(&mut self) -> Result<()> {
        let cron = str_value(&self.cron).trim();
        if cron.is_empty() {
            return Err(ConfigError::validation("schedule: cron is required"));
        }
        validate_cron(cron)
    }
}

fn validate_cron(expr: &str) -> Result<()> {
    if expr.starts_with('@') {
        if CRON_DESCRIPTORS.contains(&expr.to_lowercase().as_str()) {
            return Ok(());
        }
        return Err(ConfigError::validation(format!(
            "schedule: unsupported cron descriptor {expr:?}"
        )));
    }

    let fields: Vec<&str> = expr.split_whitespace().collect();
    if !(5..=7).contains(&fields.len()) {
        return Err(ConfigError::validation(format!(
            "schedule: cron {expr:?} must have between 5 and 7 fields, found {}",
            fields.len()
        )));
    }

    if let Some(bad) = fields.iter().find(|f| !CRON_FIELD.is_match(f)) {
        return Err(ConfigError::validation(format!(
            "schedule: invalid cron field {bad:?} in {expr:?}"
        )));
    }
    Ok(())
}
