// src/config/monitor/mod.rs

//! Monitor blocks: what kind of Consul object a task watches.
//!
//! The set of monitor kinds is closed. Each kind is its own struct that
//! implements [`MonitorBlock`]; [`MonitorConfig`] is the tagged union the
//! rest of the crate works with, dispatching by `match`.
//!
//! The same kinds back both `condition` blocks (when a task runs) and
//! `module_input` blocks (what data a task receives).

mod catalog_services;
mod consul_kv;
mod intentions;
mod schedule;
mod services;

pub use catalog_services::CatalogServicesMonitorConfig;
pub use consul_kv::ConsulKvMonitorConfig;
pub use intentions::{IntentionsMonitorConfig, IntentionsServicesConfig};
pub use schedule::ScheduleMonitorConfig;
pub use services::ServicesMonitorConfig;

use std::fmt;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::merge::Merge;
use crate::errors::{ConfigError, Result};

pub const SERVICES: &str = "services";
pub const CATALOG_SERVICES: &str = "catalog-services";
pub const CONSUL_KV: &str = "consul-kv";
pub const SCHEDULE: &str = "schedule";
pub const INTENTIONS: &str = "intentions";

/// Uniform contract implemented by every monitor kind.
///
/// `validate` may normalize a field that `finalize` deliberately left unset
/// (see [`CatalogServicesMonitorConfig`]); running it again on a validated
/// block is a no-op.
pub trait MonitorBlock: Merge + fmt::Debug + DeserializeOwned {
    /// Stable tag naming the variable type this block feeds.
    const VARIABLE_TYPE: &'static str;

    fn finalize(&mut self);

    fn validate(&mut self) -> Result<()>;
}

/// A single monitor block, or the explicit "nothing configured" sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MonitorConfig {
    #[default]
    None,
    Services(ServicesMonitorConfig),
    CatalogServices(CatalogServicesMonitorConfig),
    ConsulKv(ConsulKvMonitorConfig),
    Schedule(ScheduleMonitorConfig),
    Intentions(IntentionsMonitorConfig),
}

impl MonitorConfig {
    /// The variable type this block watches; `""` for [`MonitorConfig::None`].
    pub fn variable_type(&self) -> &'static str {
        match self {
            MonitorConfig::None => "",
            MonitorConfig::Services(_) => ServicesMonitorConfig::VARIABLE_TYPE,
            MonitorConfig::CatalogServices(_) => CatalogServicesMonitorConfig::VARIABLE_TYPE,
            MonitorConfig::ConsulKv(_) => ConsulKvMonitorConfig::VARIABLE_TYPE,
            MonitorConfig::Schedule(_) => ScheduleMonitorConfig::VARIABLE_TYPE,
            MonitorConfig::Intentions(_) => IntentionsMonitorConfig::VARIABLE_TYPE,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MonitorConfig::None)
    }

    pub fn finalize(&mut self) {
        match self {
            MonitorConfig::None => {}
            MonitorConfig::Services(m) => m.finalize(),
            MonitorConfig::CatalogServices(m) => m.finalize(),
            MonitorConfig::ConsulKv(m) => m.finalize(),
            MonitorConfig::Schedule(m) => m.finalize(),
            MonitorConfig::Intentions(m) => m.finalize(),
        }
    }

    pub fn validate(&mut self) -> Result<()> {
        match self {
            MonitorConfig::None => Ok(()),
            MonitorConfig::Services(m) => m.validate(),
            MonitorConfig::CatalogServices(m) => m.validate(),
            MonitorConfig::ConsulKv(m) => m.validate(),
            MonitorConfig::Schedule(m) => m.validate(),
            MonitorConfig::Intentions(m) => m.validate(),
        }
    }

    /// Decode the body of a `<block> "<type_name>"` block.
    ///
    /// `allowed` restricts which kinds the enclosing block accepts. Unknown
    /// fields in the body are rejected.
    pub(crate) fn decode(
        block: &str,
        type_name: &str,
        body: Map<String, Value>,
        allowed: &[&str],
    ) -> std::result::Result<Self, String> {
        if !allowed.contains(&type_name) {
            return Err(format!(
                "unsupported {block} type {type_name:?}; expected one of: {}",
                allowed.join(", ")
            ));
        }

        let body = Value::Object(body);
        let decoded = match type_name {
            SERVICES => MonitorConfig::Services(decode_body(block, type_name, body)?),
            CATALOG_SERVICES => MonitorConfig::CatalogServices(decode_body(block, type_name, body)?),
            CONSUL_KV => MonitorConfig::ConsulKv(decode_body(block, type_name, body)?),
            SCHEDULE => MonitorConfig::Schedule(decode_body(block, type_name, body)?),
            INTENTIONS => MonitorConfig::Intentions(decode_body(block, type_name, body)?),
            other => return Err(format!("unsupported {block} type {other:?}")),
        };
        Ok(decoded)
    }
}

impl Merge for MonitorConfig {
    /// Same kind: field-wise merge. Different kinds: `other` replaces `self`.
    /// The `None` sentinel on either side yields a copy of the other side.
    fn merge(&self, other: &Self) -> Self {
        match (self, other) {
            (_, MonitorConfig::None) => self.clone(),
            (MonitorConfig::None, _) => other.clone(),
            (MonitorConfig::Services(a), MonitorConfig::Services(b)) => {
                MonitorConfig::Services(a.merge(b))
            }
            (MonitorConfig::CatalogServices(a), MonitorConfig::CatalogServices(b)) => {
                MonitorConfig::CatalogServices(a.merge(b))
            }
            (MonitorConfig::ConsulKv(a), MonitorConfig::ConsulKv(b)) => {
                MonitorConfig::ConsulKv(a.merge(b))
            }
            (MonitorConfig::Schedule(a), MonitorConfig::Schedule(b)) => {
                MonitorConfig::Schedule(a.merge(b))
            }
            (MonitorConfig::Intentions(a), MonitorConfig::Intentions(b)) => {
                MonitorConfig::Intentions(a.merge(b))
            }
            _ => other.clone(),
        }
    }
}

fn decode_body<T: MonitorBlock>(
    block: &str,
    type_name: &str,
    body: Value,
) -> std::result::Result<T, String> {
    serde_json::from_value(body).map_err(|e| format!("{block} {type_name:?}: {e}"))
}

/// Split a `{"<type>": {...}}` block into its single type key and body.
///
/// The body may also be a one-element list of objects, which is how block
/// syntax looks after conversion to JSON.
pub(crate) fn split_typed_block(
    block: &str,
    value: Value,
) -> std::result::Result<(String, Map<String, Value>), String> {
    let Value::Object(map) = value else {
        return Err(format!(
            "{block} block must be a map of the form {{\"<type>\": {{...}}}}"
        ));
    };

    if map.len() != 1 {
        let found = if map.is_empty() {
            "none".to_string()
        } else {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("{} ({})", keys.len(), keys.join(", "))
        };
        return Err(format!(
            "{block} block must specify exactly one type, found {found}"
        ));
    }

    let Some((type_name, body)) = map.into_iter().next() else {
        return Err(format!("{block} block must specify exactly one type, found none"));
    };

    let body = match body {
        Value::Object(body) => body,
        Value::Null => Map::new(),
        Value::Array(mut items) if items.len() == 1 => match items.pop() {
            Some(Value::Object(body)) => body,
            _ => return Err(format!("{block} {type_name:?} body must be a map")),
        },
        Value::Array(items) => {
            return Err(format!(
                "{block} {type_name:?} must be configured once, found {} blocks",
                items.len()
            ));
        }
        _ => return Err(format!("{block} {type_name:?} body must be a map")),
    };

    Ok((type_name, body))
}

/// Compile a user regexp, reporting the owning block on failure.
pub(crate) fn compile_regexp(block: &str, field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ConfigError::validation(format!(
            "{block}: unable to compile {field} {pattern:?}: {e}"
        ))
    })
}

/// Name lists may not contain empty entries.
pub(crate) fn validate_names(block: &str, field: &str, names: &[String]) -> Result<()> {
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "{block}: {field} must not contain empty strings"
        )));
    }
    Ok(())
}
