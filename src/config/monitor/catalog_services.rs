// src/config/monitor/catalog_services.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{compile_regexp, MonitorBlock, CATALOG_SERVICES};
use crate::config::merge::{merge_map, merge_scalar, Merge};
use crate::config::scalar::default_to;
use crate::errors::Result;

/// `catalog-services` monitor: watches the set of services registered in
/// the catalog, not their instances.
///
/// `regexp` stays unset through finalize so that a task can derive it from
/// its legacy `services` list. If nothing supplied one by validation time
/// it becomes `""`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogServicesMonitorConfig {
    pub regexp: Option<String>,
    pub datacenter: Option<String>,
    pub namespace: Option<String>,

    #[serde(default)]
    pub node_meta: BTreeMap<String, String>,
}

impl CatalogServicesMonitorConfig {
    /// Build `^a$|^b$|...` from a list of service names.
    pub fn regexp_from_names(names: &[String]) -> String {
        names
            .iter()
            .map(|n| format!("^{}$", regex::escape(n)))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Merge for CatalogServicesMonitorConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            regexp: merge_scalar(&self.regexp, &other.regexp),
            datacenter: merge_scalar(&self.datacenter, &other.datacenter),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            node_meta: merge_map(&self.node_meta, &other.node_meta),
        }
    }
}

impl MonitorBlock for CatalogServicesMonitorConfig {
    const VARIABLE_TYPE: &'static str = CATALOG_SERVICES;

    fn finalize(&mut self) {
        default_to(&mut self.datacenter, String::new());
        default_to(&mut self.namespace, String::new());
    }

    fn validate(&mut self) -> Result<()> {
        let pattern = self.regexp.get_or_insert_with(String::new);
        compile_regexp(CATALOG_SERVICES, "regexp", pattern)?;
        Ok(())
    }
}
