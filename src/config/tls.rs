// src/config/tls.rs

//! TLS settings.
//!
//! [`TlsConfig`] is the client side used for Consul and Vault connections.
//! [`ServerTlsConfig`] is the top-level `tls` block securing the daemon's
//! own API.

use serde::Deserialize;

use crate::config::merge::{merge_scalar, Merge};
use crate::config::scalar::{default_to, is_present, str_value};
use crate::errors::{ConfigError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsConfig {
    pub ca_cert: Option<String>,
    pub ca_path: Option<String>,
    pub cert: Option<String>,
    pub enabled: Option<bool>,
    pub key: Option<String>,
    pub server_name: Option<String>,
    pub verify: Option<bool>,
}

impl TlsConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Giving any certificate material implies `enabled = true` unless
    /// `enabled` was set explicitly.
    pub fn finalize(&mut self) {
        if self.enabled.is_none() {
            self.enabled = Some(
                is_present(&self.ca_cert)
                    || is_present(&self.ca_path)
                    || is_present(&self.cert)
                    || is_present(&self.key)
                    || is_present(&self.server_name),
            );
        }
        default_to(&mut self.ca_cert, String::new());
        default_to(&mut self.ca_path, String::new());
        default_to(&mut self.cert, String::new());
        default_to(&mut self.key, String::new());
        default_to(&mut self.server_name, String::new());
        default_to(&mut self.verify, true);
    }

    pub fn validate(&self, owner: &str) -> Result<()> {
        let has_cert = !str_value(&self.cert).is_empty();
        let has_key = !str_value(&self.key).is_empty();
        if has_cert != has_key {
            return Err(ConfigError::validation(format!(
                "{owner}.tls: cert and key must be configured together"
            )));
        }
        Ok(())
    }
}

impl Merge for TlsConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            ca_cert: merge_scalar(&self.ca_cert, &other.ca_cert),
            ca_path: merge_scalar(&self.ca_path, &other.ca_path),
            cert: merge_scalar(&self.cert, &other.cert),
            enabled: merge_scalar(&self.enabled, &other.enabled),
            key: merge_scalar(&self.key, &other.key),
            server_name: merge_scalar(&self.server_name, &other.server_name),
            verify: merge_scalar(&self.verify, &other.verify),
        }
    }
}

/// ```toml
/// [tls]
/// enabled = true
/// cert = "/etc/nia/cert.pem"
/// key = "/etc/nia/key.pem"
/// verify_incoming = true
/// ca_cert = "/etc/nia/ca.pem"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerTlsConfig {
    pub enabled: Option<bool>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub verify_incoming: Option<bool>,
    pub ca_cert: Option<String>,
    pub ca_path: Option<String>,
}

impl ServerTlsConfig {
    pub fn finalize(&mut self) {
        default_to(&mut self.enabled, false);
        default_to(&mut self.cert, String::new());
        default_to(&mut self.key, String::new());
        default_to(&mut self.verify_incoming, false);
        default_to(&mut self.ca_cert, String::new());
        default_to(&mut self.ca_path, String::new());
    }

    pub fn validate(&self) -> Result<()> {
        if !self.enabled.unwrap_or(false) {
            return Ok(());
        }
        if str_value(&self.cert).is_empty() || str_value(&self.key).is_empty() {
            return Err(ConfigError::validation(
                "tls: cert and key are required when TLS is enabled",
            ));
        }
        if self.verify_incoming.unwrap_or(false)
            && str_value(&self.ca_cert).is_empty()
            && str_value(&self.ca_path).is_empty()
        {
            return Err(ConfigError::validation(
                "tls: ca_cert or ca_path is required when verify_incoming is enabled",
            ));
        }
        Ok(())
    }
}

impl Merge for ServerTlsConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            cert: merge_scalar(&self.cert, &other.cert),
            key: merge_scalar(&self.key, &other.key),
            verify_incoming: merge_scalar(&self.verify_incoming, &other.verify_incoming),
            ca_cert: merge_scalar(&self.ca_cert, &other.ca_cert),
            ca_path: merge_scalar(&self.ca_path, &other.ca_path),
        }
    }
}
