// src/config/model.rs

use serde::Deserialize;
use serde_json::Value;

use crate::config::buffer_period::BufferPeriodConfig;
use crate::config::consul::ConsulConfig;
use crate::config::diagnostics::Diagnostics;
use crate::config::driver::DriverConfig;
use crate::config::merge::{merge_block, merge_scalar, Merge};
use crate::config::provider::{validate_providers, TerraformProviderConfig};
use crate::config::scalar::{default_to, str_value};
use crate::config::service::{validate_services, ServiceConfig};
use crate::config::syslog::SyslogConfig;
use crate::config::task::TaskConfig;
use crate::config::tls::ServerTlsConfig;
use crate::config::validate::validate_config;
use crate::config::vault::VaultConfig;
use crate::errors::{ConfigError, Result};

pub const DEFAULT_PORT: u16 = 8558;
pub const DEFAULT_ID: &str = "consul-terraform-sync";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_WORKING_DIR: &str = "sync-tasks";

/// Top-level configuration, as decoded from one fragment or merged from
/// several.
///
/// ```toml
/// port = 8558
/// working_dir = "sync-tasks"
///
/// [consul]
/// address = "127.0.0.1:8500"
///
/// [buffer_period]
/// min = "5s"
/// max = "20s"
///
/// [[task]]
/// name = "web"
/// module = "org/web/local"
///
/// [task.condition.services]
/// names = ["web"]
/// ```
///
/// Everything is optional until [`Config::finalize`] has run; after that
/// every block and scalar is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub port: Option<u16>,
    pub id: Option<String>,
    pub log_level: Option<String>,
    pub client_type: Option<String>,

    /// Root directory for per-task working directories.
    pub working_dir: Option<String>,

    pub syslog: Option<SyslogConfig>,
    pub consul: Option<ConsulConfig>,
    pub vault: Option<VaultConfig>,
    pub driver: Option<DriverConfig>,

    #[serde(default)]
    pub task: Vec<TaskConfig>,

    #[serde(default)]
    pub service: Vec<ServiceConfig>,

    #[serde(default)]
    pub terraform_provider: Vec<TerraformProviderConfig>,

    /// Default buffer period for every task.
    pub buffer_period: Option<BufferPeriodConfig>,

    pub tls: Option<ServerTlsConfig>,
}

impl Config {
    /// Decode a parsed document. Unknown keys and ambiguous monitor blocks
    /// are decode errors.
    pub fn from_document(document: Value) -> Result<Self> {
        serde_json::from_value(document).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    pub fn log_level(&self) -> &str {
        str_value(&self.log_level)
    }

    pub fn working_dir(&self) -> &str {
        str_value(&self.working_dir)
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.iter().find(|t| t.name() == name)
    }

    pub fn vault_enabled(&self) -> bool {
        self.vault.as_ref().is_some_and(VaultConfig::is_enabled)
    }

    /// Fill every unset value with its default.
    ///
    /// Blocks are finalized in dependency order: the Terraform backend is
    /// derived from Consul, and tasks inherit the global buffer period and
    /// working directory. Running it twice is a no-op.
    pub fn finalize(&mut self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        default_to(&mut self.port, DEFAULT_PORT);
        default_to(&mut self.id, DEFAULT_ID.to_string());
        default_to(&mut self.log_level, DEFAULT_LOG_LEVEL.to_string());
        default_to(&mut self.client_type, String::new());
        default_to(&mut self.working_dir, DEFAULT_WORKING_DIR.to_string());

        self.syslog.get_or_insert_with(SyslogConfig::default).finalize();

        let consul = self.consul.get_or_insert_with(ConsulConfig::default);
        consul.finalize();
        self.driver
            .get_or_insert_with(DriverConfig::default)
            .finalize(consul);

        self.vault.get_or_insert_with(VaultConfig::default).finalize();
        self.tls.get_or_insert_with(ServerTlsConfig::default).finalize();

        let buffer_period = self
            .buffer_period
            .get_or_insert_with(BufferPeriodConfig::default_config);
        buffer_period.finalize(&BufferPeriodConfig::default_config());

        let working_dir = str_value(&self.working_dir);
        for task in &mut self.task {
            task.finalize(buffer_period, working_dir, &mut diags);
        }

        self.service.iter_mut().for_each(ServiceConfig::finalize);

        diags
    }

    /// Check every block, then the cross-block rules. Returns the first
    /// violation found. Expects a finalized config.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(consul) = &self.consul {
            consul.validate()?;
        }
        if let Some(vault) = &self.vault {
            vault.validate()?;
        }
        if let Some(tls) = &self.tls {
            tls.validate()?;
        }
        if let Some(driver) = &self.driver {
            driver.validate()?;
        }
        for task in &mut self.task {
            task.validate()?;
        }
        validate_services(&self.service)?;
        validate_providers(&self.terraform_provider)?;
        if let Some(bp) = &self.buffer_period {
            bp.validate()?;
        }
        validate_config(self)
    }
}

impl Merge for Config {
    fn merge(&self, other: &Self) -> Self {
        Self {
            port: merge_scalar(&self.port, &other.port),
            id: merge_scalar(&self.id, &other.id),
            log_level: merge_scalar(&self.log_level, &other.log_level),
            client_type: merge_scalar(&self.client_type, &other.client_type),
            working_dir: merge_scalar(&self.working_dir, &other.working_dir),
            syslog: merge_block(&self.syslog, &other.syslog),
            consul: merge_block(&self.consul, &other.consul),
            vault: merge_block(&self.vault, &other.vault),
            driver: merge_block(&self.driver, &other.driver),
            task: self.task.merge(&other.task),
            service: self.service.merge(&other.service),
            terraform_provider: self.terraform_provider.merge(&other.terraform_provider),
            buffer_period: merge_block(&self.buffer_period, &other.buffer_period),
            tls: merge_block(&self.tls, &other.tls),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::diagnostics::DiagnosticKind;
    use crate::config::monitor::MonitorConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn decode(doc: Value) -> Config {
        Config::from_document(doc).unwrap()
    }

    #[test]
    fn empty_document_finalizes_to_defaults() {
        let mut config = decode(json!({}));
        let diags = config.finalize();
        assert!(diags.is_empty());
        assert_eq!(config.port, Some(DEFAULT_PORT));
        assert_eq!(config.id.as_deref(), Some(DEFAULT_ID));
        assert_eq!(config.log_level(), DEFAULT_LOG_LEVEL);
        assert_eq!(config.working_dir(), DEFAULT_WORKING_DIR);
        assert_eq!(
            config.buffer_period,
            Some(BufferPeriodConfig::default_config())
        );
        assert!(config.driver.as_ref().unwrap().terraform.is_some());
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_decode_errors() {
        let err = Config::from_document(json!({"prot": 8558})).unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
        assert!(err.to_string().contains("prot"));

        let err = Config::from_document(json!({
            "task": [{"name": "t", "condition": {"services": {"names": ["a"], "bogus": 1}}}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn tasks_inherit_global_buffer_period() {
        let mut config = decode(json!({
            "buffer_period": {"min": "1s", "max": "3s"},
            "task": [
                {"name": "inherits", "module": "m", "services": ["api"]},
                {"name": "own", "module": "m", "services": ["api"],
                 "buffer_period": {"min": "5s", "max": "7s"}}
            ]
        }));
        config.finalize();

        let inherited = config.task("inherits").unwrap().buffer_period.clone().unwrap();
        assert_eq!(inherited.min, Some(Duration::from_secs(1)));
        assert_eq!(inherited.max, Some(Duration::from_secs(3)));

        let own = config.task("own").unwrap().buffer_period.clone().unwrap();
        assert_eq!(own.min, Some(Duration::from_secs(5)));
        assert_eq!(own.max, Some(Duration::from_secs(7)));
        config.validate().unwrap();
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut config = decode(json!({
            "consul": {"address": "127.0.0.1:8500", "kv_path": "custom-path"},
            "task": [{
                "name": "web",
                "module": "org/web",
                "source_input": {"consul-kv": {"path": "web/config"}},
                "condition": {"catalog-services": {}},
                "services": ["web"]
            }]
        }));
        let first = config.finalize();
        assert!(first.has_kind(DiagnosticKind::DeprecatedField));
        let once = config.clone();
        config.finalize();
        assert_eq!(config, once);
    }

    #[test]
    fn merge_concatenates_tasks_and_overrides_scalars() {
        let a = decode(json!({
            "port": 9000,
            "task": [{"name": "a", "module": "m", "services": ["x"]}]
        }));
        let b = decode(json!({
            "log_level": "debug",
            "task": [{"name": "b", "module": "m", "services": ["y"]}]
        }));
        let merged = a.merge(&b);
        assert_eq!(merged.port, Some(9000));
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        let names: Vec<&str> = merged.task.iter().map(TaskConfig::name).collect();
        assert_eq!(names, ["a", "b"]);

        assert_eq!(a.merge(&Config::default()), a);
        assert_eq!(Config::default().merge(&a), a);
    }

    #[test]
    fn schedule_task_decodes_from_list_form() {
        let mut config = decode(json!({
            "task": [{
                "name": "nightly",
                "module": "m",
                "condition": [{"schedule": {"cron": "0 0 * * *"}}],
                "module_input": [{"services": {"names": ["api"]}}]
            }]
        }));
        config.finalize();
        let task = config.task("nightly").unwrap();
        assert!(matches!(task.condition.monitor, MonitorConfig::Schedule(_)));
        assert_eq!(task.buffer_period, Some(BufferPeriodConfig::disabled()));
        config.validate().unwrap();
    }
}
