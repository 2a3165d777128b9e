// src/config/consul.rs

//! `[consul]` connection settings.
//!
//! ```toml
//! [consul]
//! address = "127.0.0.1:8500"
//! token = "..."
//! kv_path = "nia/"
//!
//! [consul.tls]
//! ca_cert = "/etc/consul/ca.pem"
//!
//! [consul.service_registration]
//! service_name = "nia"
//! ```

use std::fmt;

use serde::Deserialize;

use crate::config::merge::{merge_block, merge_scalar, Merge};
use crate::config::scalar::{default_to, is_present, str_value};
use crate::config::tls::TlsConfig;
use crate::config::transport::TransportConfig;
use crate::config::Redacted;
use crate::errors::Result;

pub const DEFAULT_CONSUL_ADDRESS: &str = "localhost:8500";
pub const DEFAULT_CONSUL_KV_PATH: &str = "consul-terraform-sync/";
pub const DEFAULT_SERVICE_NAME: &str = "Consul-Terraform-Sync";

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsulConfig {
    pub address: Option<String>,
    pub auth: Option<AuthConfig>,
    pub kv_namespace: Option<String>,
    pub kv_path: Option<String>,
    pub tls: Option<TlsConfig>,
    pub token: Option<String>,
    pub transport: Option<TransportConfig>,
    pub service_registration: Option<ServiceRegistrationConfig>,
}

impl ConsulConfig {
    pub fn address(&self) -> &str {
        str_value(&self.address)
    }

    pub fn kv_path(&self) -> &str {
        str_value(&self.kv_path)
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.as_ref().is_some_and(TlsConfig::is_enabled)
    }

    pub fn finalize(&mut self) {
        default_to(&mut self.address, DEFAULT_CONSUL_ADDRESS.to_string());
        self.auth.get_or_insert_with(AuthConfig::default).finalize();
        default_to(&mut self.kv_namespace, String::new());
        default_to(&mut self.kv_path, DEFAULT_CONSUL_KV_PATH.to_string());
        self.tls.get_or_insert_with(TlsConfig::default).finalize();
        default_to(&mut self.token, String::new());
        self.transport
            .get_or_insert_with(TransportConfig::default)
            .finalize();
        self.service_registration
            .get_or_insert_with(ServiceRegistrationConfig::default)
            .finalize();
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tls) = &self.tls {
            tls.validate("consul")?;
        }
        Ok(())
    }
}

impl Merge for ConsulConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            address: merge_scalar(&self.address, &other.address),
            auth: merge_block(&self.auth, &other.auth),
            kv_namespace: merge_scalar(&self.kv_namespace, &other.kv_namespace),
            kv_path: merge_scalar(&self.kv_path, &other.kv_path),
            tls: merge_block(&self.tls, &other.tls),
            token: merge_scalar(&self.token, &other.token),
            transport: merge_block(&self.transport, &other.transport),
            service_registration: merge_block(
                &self.service_registration,
                &other.service_registration,
            ),
        }
    }
}

impl fmt::Debug for ConsulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsulConfig")
            .field("address", &self.address)
            .field("auth", &self.auth)
            .field("kv_namespace", &self.kv_namespace)
            .field("kv_path", &self.kv_path)
            .field("tls", &self.tls)
            .field("token", &self.token.as_ref().map(|_| Redacted))
            .field("transport", &self.transport)
            .field("service_registration", &self.service_registration)
            .finish()
    }
}

/// HTTP basic auth for Consul.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub enabled: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn finalize(&mut self) {
        if self.enabled.is_none() {
            self.enabled = Some(is_present(&self.username) || is_present(&self.password));
        }
        default_to(&mut self.username, String::new());
        default_to(&mut self.password, String::new());
    }
}

impl Merge for AuthConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            username: merge_scalar(&self.username, &other.username),
            password: merge_scalar(&self.password, &other.password),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| Redacted))
            .finish()
    }
}

/// Registration of the daemon itself as a Consul service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceRegistrationConfig {
    pub enabled: Option<bool>,
    pub service_name: Option<String>,
    pub address: Option<String>,
    pub namespace: Option<String>,
    pub default_check: Option<DefaultCheckConfig>,
}

impl ServiceRegistrationConfig {
    pub fn finalize(&mut self) {
        default_to(&mut self.enabled, true);
        default_to(&mut self.service_name, DEFAULT_SERVICE_NAME.to_string());
        default_to(&mut self.address, String::new());
        default_to(&mut self.namespace, String::new());
        self.default_check
            .get_or_insert_with(DefaultCheckConfig::default)
            .finalize();
    }
}

impl Merge for ServiceRegistrationConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            service_name: merge_scalar(&self.service_name, &other.service_name),
            address: merge_scalar(&self.address, &other.address),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            default_check: merge_block(&self.default_check, &other.default_check),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultCheckConfig {
    pub enabled: Option<bool>,
    pub address: Option<String>,
}

impl DefaultCheckConfig {
    pub fn finalize(&mut self) {
        default_to(&mut self.enabled, true);
        default_to(&mut self.address, String::new());
    }
}

impl Merge for DefaultCheckConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            address: merge_scalar(&self.address, &other.address),
        }
    }
}
