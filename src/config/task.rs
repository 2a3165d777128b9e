// src/config/task.rs

//! `[[task]]` blocks.
//!
//! A task pairs a Terraform module with the Consul objects it reacts to
//! (the condition) and the data it is fed (module inputs). The legacy flat
//! `services` list and `source`/`source_input` fields are still accepted and
//! reconciled into their replacements at finalize time.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::buffer_period::BufferPeriodConfig;
use crate::config::condition::ConditionConfig;
use crate::config::diagnostics::{DiagnosticKind, Diagnostics};
use crate::config::merge::{concat, merge_block, merge_map, merge_scalar, Merge};
use crate::config::module_input::ModuleInputConfigs;
use crate::config::monitor::{CatalogServicesMonitorConfig, MonitorConfig};
use crate::config::provider::provider_base_name;
use crate::config::scalar::{default_to, str_value};
use crate::errors::{ConfigError, Result};

static TASK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static task name regex"));

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Unique task name; also the last component of the working directory.
    pub name: Option<String>,

    pub description: Option<String>,

    /// Provider IDs (`"aws"`, `"aws.east"`) this task's module uses.
    #[serde(default)]
    pub providers: Vec<String>,

    /// Legacy service list. Prefer a `services` condition or module input.
    #[serde(default)]
    pub services: Vec<String>,

    /// Module source (registry address, git URL or local path).
    pub module: Option<String>,

    /// Superseded by `module`.
    #[serde(default, rename = "source")]
    pub deprecated_source: Option<String>,

    /// Module version constraint.
    pub version: Option<String>,

    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub var_files: Vec<String>,

    pub buffer_period: Option<BufferPeriodConfig>,

    pub enabled: Option<bool>,

    #[serde(default)]
    pub condition: ConditionConfig,

    #[serde(default)]
    pub module_input: ModuleInputConfigs,

    /// Superseded by `module_input`.
    #[serde(default, rename = "source_input")]
    pub deprecated_source_input: ModuleInputConfigs,

    pub working_dir: Option<String>,
}

impl TaskConfig {
    /// The task name, `""` when unset.
    pub fn name(&self) -> &str {
        str_value(&self.name)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Fill defaults. Never fails; advisories go to `diags`.
    ///
    /// `buffer_period` is the finalized global buffer period and
    /// `working_dir_root` the finalized top-level working directory.
    pub fn finalize(
        &mut self,
        buffer_period: &BufferPeriodConfig,
        working_dir_root: &str,
        diags: &mut Diagnostics,
    ) {
        self.reconcile_deprecated(diags);

        default_to(&mut self.name, String::new());
        default_to(&mut self.description, String::new());
        default_to(&mut self.module, String::new());
        default_to(&mut self.version, String::new());
        default_to(&mut self.enabled, true);

        // An absent condition is already the `None` sentinel.
        self.condition.finalize(diags);
        if let MonitorConfig::CatalogServices(catalog) = &mut self.condition.monitor {
            if catalog.regexp.is_none() && !self.services.is_empty() {
                catalog.regexp = Some(CatalogServicesMonitorConfig::regexp_from_names(
                    &self.services,
                ));
            }
        }

        self.finalize_buffer_period(buffer_period, diags);

        self.module_input.finalize();

        if self.working_dir.is_none() {
            let dir = Path::new(working_dir_root).join(self.name());
            self.working_dir = Some(dir.to_string_lossy().into_owned());
        }
    }

    fn reconcile_deprecated(&mut self, diags: &mut Diagnostics) {
        let task = self.name().to_string();

        if let Some(source) = self.deprecated_source.take() {
            if !source.is_empty() {
                diags.warn(
                    DiagnosticKind::DeprecatedField,
                    format!("task {task:?}: the `source` field is deprecated; use `module` instead"),
                );
                match self.module.as_deref() {
                    None | Some("") => self.module = Some(source),
                    Some(module) if module != source => diags.warn(
                        DiagnosticKind::ConflictingDeprecatedField,
                        format!(
                            "task {task:?}: both `module` and `source` are configured; \
                             using `module` ({module:?})"
                        ),
                    ),
                    Some(_) => {}
                }
            }
        }

        if !self.deprecated_source_input.is_empty() {
            diags.warn(
                DiagnosticKind::DeprecatedField,
                format!(
                    "task {task:?}: the `source_input` block is deprecated; use `module_input` instead"
                ),
            );
            let legacy = std::mem::take(&mut self.deprecated_source_input);
            self.module_input = self.module_input.merge(&legacy);
        }

        if !self.services.is_empty() {
            diags.warn(
                DiagnosticKind::DeprecatedField,
                format!(
                    "task {task:?}: the `services` field is deprecated; use a `condition \"services\"` \
                     or `module_input \"services\"` block instead"
                ),
            );
        }
    }

    fn finalize_buffer_period(&mut self, global: &BufferPeriodConfig, diags: &mut Diagnostics) {
        if matches!(self.condition.monitor, MonitorConfig::Schedule(_)) {
            let disabled = BufferPeriodConfig::disabled();
            if self.buffer_period.as_ref().is_some_and(|bp| *bp != disabled) {
                diags.warn(
                    DiagnosticKind::OverriddenValue,
                    format!(
                        "task {:?}: buffer_period is not supported for tasks with a schedule \
                         condition and will be disabled",
                        self.name()
                    ),
                );
            }
            self.buffer_period = Some(disabled);
            return;
        }

        let mut bp = self.buffer_period.take().unwrap_or_else(|| global.clone());
        bp.finalize(global);
        self.buffer_period = Some(bp);
    }

    /// Check the task's invariants, returning the first violation.
    pub fn validate(&mut self) -> Result<()> {
        let name = self.name().to_string();
        if name.is_empty() {
            return Err(ConfigError::validation("unique name for the task is required"));
        }
        if !TASK_NAME.is_match(&name) {
            return Err(ConfigError::validation(format!(
                "unsupported task name format {name:?}: task names must start with a letter or \
                 underscore and may only contain letters, digits, underscores and dashes"
            )));
        }

        if str_value(&self.module).is_empty() {
            return Err(ConfigError::validation(format!(
                "task {name:?}: module is required"
            )));
        }

        self.validate_condition(&name)?;

        if self.services.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::validation(format!(
                "task {name:?}: services must not contain empty strings"
            )));
        }

        self.condition
            .validate()
            .map_err(|e| ConfigError::validation(format!("task {name:?}: {}", e.message())))?;

        self.module_input
            .validate(&self.services, &self.condition)
            .map_err(|e| ConfigError::validation(format!("task {name:?}: {}", e.message())))?;

        self.validate_providers(&name)?;

        if let Some(bp) = &self.buffer_period {
            bp.validate()
                .map_err(|e| ConfigError::validation(format!("task {name:?}: {}", e.message())))?;
        }
        Ok(())
    }

    fn validate_condition(&self, name: &str) -> Result<()> {
        if self.services.is_empty() && self.condition.is_none() {
            return Err(ConfigError::validation(format!(
                "task {name:?}: at least one service or a condition must be configured"
            )));
        }

        match &self.condition.monitor {
            MonitorConfig::CatalogServices(catalog)
                if catalog.regexp.is_none() && self.services.is_empty() =>
            {
                Err(ConfigError::validation(format!(
                    "task {name:?}: catalog-services condition requires either the regexp field \
                     or the task `services` field to be configured"
                )))
            }
            MonitorConfig::Services(_) if !self.services.is_empty() => {
                Err(ConfigError::validation(format!(
                    "task {name:?}: a task cannot be configured with both the `services` field \
                     and a `condition \"services\"` block; only one can be configured per task"
                )))
            }
            MonitorConfig::Schedule(_)
                if self.services.is_empty() && self.module_input.is_empty() =>
            {
                Err(ConfigError::validation(format!(
                    "task {name:?}: schedule condition requires the task `services` field or at \
                     least one module_input block"
                )))
            }
            _ => Ok(()),
        }
    }

    fn validate_providers(&self, name: &str) -> Result<()> {
        let mut seen = BTreeSet::new();
        for provider in &self.providers {
            let base = provider_base_name(provider);
            if base.is_empty() {
                return Err(ConfigError::validation(format!(
                    "task {name:?}: provider names must not be empty"
                )));
            }
            if !seen.insert(base) {
                return Err(ConfigError::validation(format!(
                    "task {name:?}: only one provider instance per provider name is allowed, \
                     found more than one for {base:?}"
                )));
            }
        }
        Ok(())
    }
}

impl Merge for TaskConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            name: merge_scalar(&self.name, &other.name),
            description: merge_scalar(&self.description, &other.description),
            providers: concat(&self.providers, &other.providers),
            services: concat(&self.services, &other.services),
            module: merge_scalar(&self.module, &other.module),
            deprecated_source: merge_scalar(&self.deprecated_source, &other.deprecated_source),
            version: merge_scalar(&self.version, &other.version),
            variables: merge_map(&self.variables, &other.variables),
            var_files: concat(&self.var_files, &other.var_files),
            buffer_period: merge_block(&self.buffer_period, &other.buffer_period),
            enabled: merge_scalar(&self.enabled, &other.enabled),
            condition: self.condition.merge(&other.condition),
            module_input: self.module_input.merge(&other.module_input),
            deprecated_source_input: self
                .deprecated_source_input
                .merge(&other.deprecated_source_input),
            working_dir: merge_scalar(&self.working_dir, &other.working_dir),
        }
    }
}
