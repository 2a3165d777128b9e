use std::time::Duration;

use proptest::prelude::*;

use nia_config::config::monitor::ServicesMonitorConfig;
use nia_config::config::{BufferPeriodConfig, Config, Merge, MonitorConfig, TaskConfig};
use nia_config_test_utils::builders::TaskConfigBuilder;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn buffer_period_strategy() -> impl Strategy<Value = Option<BufferPeriodConfig>> {
    proptest::option::of((0u64..30, 0u64..30).prop_map(|(a, b)| BufferPeriodConfig {
        enabled: None,
        min: Some(Duration::from_secs(a.min(b))),
        max: Some(Duration::from_secs(a.max(b))),
    }))
}

// Tasks over a small vocabulary so fragments collide on names and services.
fn task_strategy() -> impl Strategy<Value = TaskConfig> {
    (
        name_strategy(),
        proptest::collection::vec("(api|web|db)", 0..3),
        proptest::option::of("(\\^web|\\^api|)"),
        buffer_period_strategy(),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(name, services, regexp, buffer_period, enabled)| {
            let mut builder = TaskConfigBuilder::new(&name);
            if services.is_empty() {
                builder = builder.condition(MonitorConfig::Services(ServicesMonitorConfig {
                    regexp: Some(regexp.unwrap_or_default()),
                    ..Default::default()
                }));
            }
            for s in &services {
                builder = builder.service(s);
            }
            TaskConfig {
                buffer_period,
                enabled,
                ..builder.build()
            }
        })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        proptest::option::of(1u16..65535),
        proptest::option::of("(info|debug|)"),
        buffer_period_strategy(),
        proptest::collection::vec(task_strategy(), 0..4),
    )
        .prop_map(|(port, log_level, buffer_period, task)| Config {
            port,
            log_level,
            buffer_period,
            task,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn merge_with_default_is_identity(cfg in config_strategy()) {
        prop_assert_eq!(cfg.merge(&Config::default()), cfg.clone());
        prop_assert_eq!(Config::default().merge(&cfg), cfg);
    }

    #[test]
    fn merge_is_right_biased_and_accumulates_in_order(
        a in config_strategy(),
        b in config_strategy(),
    ) {
        let merged = a.merge(&b);
        prop_assert_eq!(merged.port, b.port.or(a.port));
        prop_assert_eq!(&merged.log_level, if b.log_level.is_some() { &b.log_level } else { &a.log_level });

        let expected: Vec<&str> = a.task.iter().chain(&b.task).map(TaskConfig::name).collect();
        let got: Vec<&str> = merged.task.iter().map(TaskConfig::name).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn merge_is_associative(
        a in config_strategy(),
        b in config_strategy(),
        c in config_strategy(),
    ) {
        prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    #[test]
    fn finalize_is_idempotent(a in config_strategy(), b in config_strategy()) {
        let mut cfg = a.merge(&b);
        cfg.finalize();
        let once = cfg.clone();
        cfg.finalize();
        prop_assert_eq!(cfg, once);
    }

    #[test]
    fn finalize_never_changes_explicit_scalars(cfg in config_strategy()) {
        let mut finalized = cfg.clone();
        finalized.finalize();
        if let Some(port) = cfg.port {
            prop_assert_eq!(finalized.port, Some(port));
        }
        if let Some(level) = &cfg.log_level {
            prop_assert_eq!(finalized.log_level.as_ref(), Some(level));
        }
        for (before, after) in cfg.task.iter().zip(&finalized.task) {
            if let Some(enabled) = before.enabled {
                prop_assert_eq!(after.enabled, Some(enabled));
            }
            if let MonitorConfig::Services(s) = &before.condition.monitor {
                match &after.condition.monitor {
                    MonitorConfig::Services(f) => prop_assert_eq!(&f.regexp, &s.regexp),
                    other => prop_assert!(false, "condition changed kind: {:?}", other),
                }
            }
        }
    }
}
