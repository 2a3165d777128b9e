// src/config/buffer_period.rs

//! Buffer period: a debounce window applied between a trigger and the task
//! run. Configured globally and optionally per task.

use std::time::Duration;

use serde::Deserialize;

use crate::config::merge::{merge_scalar, Merge};
use crate::errors::{ConfigError, Result};

pub const DEFAULT_BUFFER_PERIOD_MIN: Duration = Duration::from_secs(5);
pub const DEFAULT_BUFFER_PERIOD_MAX: Duration = Duration::from_secs(20);

/// ```toml
/// [buffer_period]
/// enabled = true
/// min = "5s"
/// max = "20s"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferPeriodConfig {
    pub enabled: Option<bool>,

    #[serde(default, with = "humantime_serde")]
    pub min: Option<Duration>,

    #[serde(default, with = "humantime_serde")]
    pub max: Option<Duration>,
}

impl BufferPeriodConfig {
    /// Built-in defaults, used as the parent of the global block.
    pub fn default_config() -> Self {
        Self {
            enabled: Some(true),
            min: Some(DEFAULT_BUFFER_PERIOD_MIN),
            max: Some(DEFAULT_BUFFER_PERIOD_MAX),
        }
    }

    /// `{enabled: false, min: 0, max: 0}`.
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            min: Some(Duration::ZERO),
            max: Some(Duration::ZERO),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Fill unset fields from `parent`, which must already be finalized.
    ///
    /// - `enabled` unset: inherited from the parent when neither bound is
    ///   set, otherwise setting a bound implies `true`.
    /// - disabled: both bounds are forced to zero.
    /// - `max` unset: the parent's max, raised to `min` if smaller.
    pub fn finalize(&mut self, parent: &BufferPeriodConfig) {
        if self.enabled.is_none() {
            let inherit = self.min.is_none() && self.max.is_none();
            self.enabled = Some(if inherit { parent.is_enabled() } else { true });
        }

        if !self.is_enabled() {
            self.min = Some(Duration::ZERO);
            self.max = Some(Duration::ZERO);
            return;
        }

        let min = *self
            .min
            .get_or_insert(parent.min.unwrap_or(DEFAULT_BUFFER_PERIOD_MIN));
        if self.max.is_none() {
            let parent_max = parent.max.unwrap_or(DEFAULT_BUFFER_PERIOD_MAX);
            self.max = Some(parent_max.max(min));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let min = self.min.unwrap_or_default();
        let max = self.max.unwrap_or_default();
        if min > max {
            return Err(ConfigError::validation(format!(
                "buffer_period min ({min:?}) cannot be greater than max ({max:?})"
            )));
        }
        Ok(())
    }
}

impl Merge for BufferPeriodConfig {
    fn merge(&self, other: &Self) -> Self {
        Self {
            enabled: merge_scalar(&self.enabled, &other.enabled),
            min: merge_scalar(&self.min, &other.min),
            max: merge_scalar(&self.max, &other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn secs(s: u64) -> Option<Duration> {
        Some(Duration::from_secs(s))
    }

    #[test]
    fn empty_block_takes_defaults() {
        let mut bp = BufferPeriodConfig::default();
        bp.finalize(&BufferPeriodConfig::default_config());
        assert_eq!(bp, BufferPeriodConfig::default_config());
    }

    #[test]
    fn setting_a_bound_enables_buffering() {
        let parent = BufferPeriodConfig::disabled();
        let mut bp = BufferPeriodConfig {
            min: secs(30),
            ..Default::default()
        };
        bp.finalize(&parent);
        assert_eq!(bp.enabled, Some(true));
        assert_eq!(bp.min, secs(30));
        // parent max (0) raised to min
        assert_eq!(bp.max, secs(30));
    }

    #[test]
    fn disabled_zeroes_bounds() {
        let mut bp = BufferPeriodConfig {
            enabled: Some(false),
            min: secs(3),
            max: secs(9),
        };
        bp.finalize(&BufferPeriodConfig::default_config());
        assert_eq!(bp, BufferPeriodConfig::disabled());
    }

    #[test]
    fn finalize_is_idempotent() {
        let parent = BufferPeriodConfig::default_config();
        let mut bp = BufferPeriodConfig {
            max: secs(60),
            ..Default::default()
        };
        bp.finalize(&parent);
        let once = bp.clone();
        bp.finalize(&parent);
        assert_eq!(bp, once);
    }

    #[test]
    fn min_greater_than_max_is_invalid() {
        let bp = BufferPeriodConfig {
            enabled: Some(true),
            min: secs(7),
            max: secs(5),
        };
        let err = bp.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("buffer_period min (7s) cannot be greater than max (5s)"));
    }

    #[test]
    fn decodes_humantime_durations() {
        let bp: BufferPeriodConfig =
            serde_json::from_value(serde_json::json!({"min": "1m30s", "max": "2m"})).unwrap();
        assert_eq!(bp.min, secs(90));
        assert_eq!(bp.max, secs(120));
        assert_eq!(bp.enabled, None);
    }
}
