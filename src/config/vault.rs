// src/config/vault.rs

//! `[vault]` settings. Vault is optional; it is only needed when provider
//! arguments are templated against Vault secrets.

use std::fmt;

use serde::Deserialize;

use crate::config::merge::{merge_block, merge_scalar, Merge};
use crate::config::scalar::{default_to, is_present};
use crate::config::tls::TlsConfig;
use crate::config::transport::TransportConfig;
use crate::config::Redacted;
use crate::errors::Result;

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    pub address: Option<String>,
    pub enabled: Option<bool>,
    pub namespace: Option<String>,
    pub renew_token: Option<bool>,
    pub tls: Option<TlsConfig>,
    pub token: Option<String>,
    pub unwrap_token: Option<bool>,
    pub transport: Option<TransportConfig>,
}

impl VaultConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Vault is enabled by configuring an address; the token is renewed by
    /// default only when one was given.
    pub fn finalize(&mut self) {
        if self.enabled.is_none() {
            self.enabled = Some(is_present(&self.address));
        }
        if self.renew_token.is_none() {
            self.renew_token = Some(is_present(&self.token));
        }
        default_to(&mut self.address, String::new());
        default_to(&mut self.namespace, String::new());
        self.tls.get_or_insert_with(TlsConfig::default).finalize();
        default_to(&mut self.token, String::new());
        default_to(&mut self.unwrap_token, false);
        self.transport
            .get_or_insert_with(TransportConfig::default)
            .finalize();
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tls) = &self.tls {
            tls.validate("vault")?;
        }
        Ok(())
    }
}

impl Merge for VaultConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            address: merge_scalar(&self.address, &other.address),
            enabled: merge_scalar(&self.enabled, &other.enabled),
            namespace: merge_scalar(&self.namespace, &other.namespace),
            renew_token: merge_scalar(&self.renew_token, &other.renew_token),
            tls: merge_block(&self.tls, &other.tls),
            token: merge_scalar(&self.token, &other.token),
            unwrap_token: merge_scalar(&self.unwrap_token, &other.unwrap_token),
            transport: merge_block(&self.transport, &other.transport),
        }
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("enabled", &self.enabled)
            .field("namespace", &self.namespace)
            .field("renew_token", &self.renew_token)
            .field("tls", &self.tls)
            .field("token", &self.token.as_ref().map(|_| Redacted))
            .field("unwrap_token", &self.unwrap_token)
            .field("transport", &self.transport)
            .finish()
    }
}
