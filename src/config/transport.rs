// src/config/transport.rs

//! HTTP transport tuning for the Consul and Vault clients.

use std::time::Duration;

use serde::Deserialize;

use crate::config::merge::{merge_scalar, Merge};
use crate::config::scalar::default_to;

pub const DEFAULT_DIAL_KEEP_ALIVE: Duration = Duration::from_secs(30);
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_IDLE_CONN_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_MAX_IDLE_CONNS: usize = 100;
pub const DEFAULT_TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    #[serde(default, with = "humantime_serde")]
    pub dial_keep_alive: Option<Duration>,

    #[serde(default, with = "humantime_serde")]
    pub dial_timeout: Option<Duration>,

    pub disable_keep_alives: Option<bool>,

    #[serde(default, with = "humantime_serde")]
    pub idle_conn_timeout: Option<Duration>,

    pub max_idle_conns: Option<usize>,

    pub max_idle_conns_per_host: Option<usize>,

    #[serde(default, with = "humantime_serde")]
    pub tls_handshake_timeout: Option<Duration>,
}

/// One more than the available parallelism.
pub fn default_max_idle_conns_per_host() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 1
}

impl TransportConfig {
    pub fn finalize(&mut self) {
        default_to(&mut self.dial_keep_alive, DEFAULT_DIAL_KEEP_ALIVE);
        default_to(&mut self.dial_timeout, DEFAULT_DIAL_TIMEOUT);
        default_to(&mut self.disable_keep_alives, false);
        default_to(&mut self.idle_conn_timeout, DEFAULT_IDLE_CONN_TIMEOUT);
        default_to(&mut self.max_idle_conns, DEFAULT_MAX_IDLE_CONNS);
        default_to(
            &mut self.max_idle_conns_per_host,
            default_max_idle_conns_per_host(),
        );
        default_to(&mut self.tls_handshake_timeout, DEFAULT_TLS_HANDSHAKE_TIMEOUT);
    }
}

impl Merge for TransportConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            dial_keep_alive: merge_scalar(&self.dial_keep_alive, &other.dial_keep_alive),
            dial_timeout: merge_scalar(&self.dial_timeout, &other.dial_timeout),
            disable_keep_alives: merge_scalar(&self.disable_keep_alives, &other.disable_keep_alives),
            idle_conn_timeout: merge_scalar(&self.idle_conn_timeout, &other.idle_conn_timeout),
            max_idle_conns: merge_scalar(&self.max_idle_conns, &other.max_idle_conns),
            max_idle_conns_per_host: merge_scalar(
                &self.max_idle_conns_per_host,
                &other.max_idle_conns_per_host,
            ),
            tls_handshake_timeout: merge_scalar(
                &self.tls_handshake_timeout,
                &other.tls_handshake_timeout,
            ),
        }
    }
}
