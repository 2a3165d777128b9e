#![allow(dead_code)]

use std::time::Duration;

use nia_config::config::{
    BufferPeriodConfig, ConditionConfig, Config, ConsulConfig, Diagnostics, ModuleInputConfig,
    MonitorConfig, TaskConfig, TerraformProviderConfig, VaultConfig,
};
use serde_json::Value;

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn with_consul(mut self, address: &str, kv_path: &str) -> Self {
        self.config.consul = Some(ConsulConfig {
            address: Some(address.to_string()),
            kv_path: Some(kv_path.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn with_vault(mut self, address: &str) -> Self {
        self.config.vault = Some(VaultConfig {
            address: Some(address.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn with_buffer_period(mut self, min: Duration, max: Duration) -> Self {
        self.config.buffer_period = Some(BufferPeriodConfig {
            enabled: None,
            min: Some(min),
            max: Some(max),
        });
        self
    }

    pub fn with_provider(mut self, name: &str, arguments: Value) -> Self {
        self.config
            .terraform_provider
            .push(TerraformProviderConfig::new(name, arguments));
        self
    }

    pub fn with_working_dir(mut self, dir: &str) -> Self {
        self.config.working_dir = Some(dir.to_string());
        self
    }

    /// The unfinalized config.
    pub fn build(self) -> Config {
        self.config
    }

    /// Finalize and validate, panicking on a validation error.
    pub fn build_valid(self) -> (Config, Diagnostics) {
        let mut config = self.config;
        let diags = config.finalize();
        if let Err(e) = config.validate() {
            panic!("builder produced an invalid config: {e}");
        }
        (config, diags)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A task running `org/module/local`, with no condition yet.
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskConfig {
                name: Some(name.to_string()),
                module: Some("org/module/local".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn module(mut self, module: &str) -> Self {
        self.task.module = Some(module.to_string());
        self
    }

    /// Use the deprecated `source` field instead of `module`.
    pub fn source(mut self, source: &str) -> Self {
        self.task.module = None;
        self.task.deprecated_source = Some(source.to_string());
        self
    }

    pub fn service(mut self, service: &str) -> Self {
        self.task.services.push(service.to_string());
        self
    }

    pub fn provider(mut self, id: &str) -> Self {
        self.task.providers.push(id.to_string());
        self
    }

    pub fn condition(mut self, monitor: MonitorConfig) -> Self {
        self.task.condition = ConditionConfig::new(monitor);
        self
    }

    pub fn module_input(mut self, monitor: MonitorConfig) -> Self {
        self.task.module_input.push(ModuleInputConfig::new(monitor));
        self
    }

    pub fn buffer_period(mut self, min: Duration, max: Duration) -> Self {
        self.task.buffer_period = Some(BufferPeriodConfig {
            enabled: None,
            min: Some(min),
            max: Some(max),
        });
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.task.enabled = Some(enabled);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
