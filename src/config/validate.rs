// src/config/validate.rs

//! Rules spanning more than one block. Each block's own invariants are
//! checked by its `validate`; what lives here needs the whole document.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::model::Config;
use crate::errors::{ConfigError, Result};

const LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "ERR", "ERROR"];

pub fn validate_config(cfg: &Config) -> Result<()> {
    validate_log_level(cfg)?;
    validate_unique_task_names(cfg)?;
    validate_vault_templates(cfg)?;
    validate_auto_commit_providers(cfg)?;
    Ok(())
}

fn validate_log_level(cfg: &Config) -> Result<()> {
    let level = cfg.log_level();
    if level.is_empty() || LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(level)) {
        return Ok(());
    }
    Err(ConfigError::validation(format!(
        "log_level {level:?} is not supported, expected one of: {}",
        LOG_LEVELS.join(", ")
    )))
}

fn validate_unique_task_names(cfg: &Config) -> Result<()> {
    let mut seen = BTreeSet::new();
    for task in &cfg.task {
        if !seen.insert(task.name()) {
            return Err(ConfigError::validation(format!(
                "duplicate task name {:?}: task names must be unique",
                task.name()
            )));
        }
    }
    Ok(())
}

/// Provider arguments templated against Vault secrets can only be rendered
/// with Vault configured.
fn validate_vault_templates(cfg: &Config) -> Result<()> {
    if cfg.vault_enabled() {
        return Ok(());
    }
    match cfg.terraform_provider.iter().find(|p| p.uses_vault()) {
        Some(provider) => Err(ConfigError::validation(format!(
            "terraform_provider {:?} uses Vault templating but Vault is not configured; \
             add a [vault] block with an address",
            provider.id()
        ))),
        None => Ok(()),
    }
}

/// A provider instance with `auto_commit` holds state that cannot be shared,
/// so at most one task may reference it.
fn validate_auto_commit_providers(cfg: &Config) -> Result<()> {
    let auto_commit: BTreeSet<String> = cfg
        .terraform_provider
        .iter()
        .filter(|p| p.auto_commit())
        .map(|p| p.id())
        .collect();
    if auto_commit.is_empty() {
        return Ok(());
    }

    let mut users: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for task in &cfg.task {
        for provider in &task.providers {
            if auto_commit.contains(provider) {
                users.entry(provider.as_str()).or_default().push(task.name());
            }
        }
    }

    match users.into_iter().find(|(_, tasks)| tasks.len() > 1) {
        Some((provider, tasks)) => Err(ConfigError::validation(format!(
            "terraform_provider {provider:?} has auto_commit enabled and cannot be shared \
             between tasks, used by: {}",
            tasks.join(", ")
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::provider::TerraformProviderConfig;
    use crate::config::task::TaskConfig;
    use crate::config::vault::VaultConfig;
    use serde_json::json;

    fn task(name: &str, providers: &[&str]) -> TaskConfig {
        TaskConfig {
            name: Some(name.into()),
            providers: providers.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn duplicate_task_names_fail() {
        let cfg = Config {
            task: vec![task("web", &[]), task("web", &[])],
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("duplicate task name \"web\""));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        for level in ["debug", "Info", "ERR", "trace"] {
            let cfg = Config {
                log_level: Some(level.into()),
                ..Default::default()
            };
            assert!(validate_config(&cfg).is_ok(), "{level}");
        }
        let cfg = Config {
            log_level: Some("verbose".into()),
            ..Default::default()
        };
        assert!(validate_config(&cfg).unwrap_err().to_string().contains("verbose"));
    }

    #[test]
    fn vault_templates_require_vault() {
        let provider = TerraformProviderConfig::new(
            "aws",
            json!({"secret_key": "{{ with secret \"aws/creds\" }}{{ .Data.key }}{{ end }}"}),
        );
        let mut cfg = Config {
            terraform_provider: vec![provider],
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Vault is not configured"));

        let mut vault = VaultConfig {
            address: Some("https://vault:8200".into()),
            ..Default::default()
        };
        vault.finalize();
        cfg.vault = Some(vault);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn auto_commit_provider_cannot_be_shared() {
        let cfg = Config {
            terraform_provider: vec![
                TerraformProviderConfig::new("aws", json!({"alias": "east", "auto_commit": true})),
                TerraformProviderConfig::new("local", json!({})),
            ],
            task: vec![
                task("a", &["aws.east", "local"]),
                task("b", &["aws.east"]),
            ],
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("\"aws.east\" has auto_commit enabled"));
        assert!(err.to_string().contains("a, b"));

        let shared_plain = Config {
            terraform_provider: vec![TerraformProviderConfig::new("local", json!({}))],
            task: vec![task("a", &["local"]), task("b", &["local"])],
            ..Default::default()
        };
        assert!(validate_config(&shared_plain).is_ok());
    }
}
