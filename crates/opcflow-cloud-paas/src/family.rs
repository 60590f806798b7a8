//! Resource families and their lifecycle defaults

use crate::error::Result;
use opcflow_cloud::{
    Cancellation, LifecycleDefaults, LifecycleObserver, Operation, PollSpec, RetrySpec,
    TracingObserver,
};
use opcflow_config::{FamilyOverrides, LifecycleConfig};
use std::sync::Arc;
use std::time::Duration;

const MINUTE: u64 = 60;

/// A resource domain with its own status vocabulary and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Database,
    Middleware,
    Container,
    AccessRule,
}

impl Family {
    pub fn kind(self) -> &'static str {
        match self {
            Family::Database => "database-instance",
            Family::Middleware => "middleware-instance",
            Family::Container => "application-container",
            Family::AccessRule => "access-rule",
        }
    }

    /// Built-in poll and delete-retry defaults
    pub fn defaults(self) -> LifecycleDefaults {
        let (interval, timeout, attempts, backoff) = match self {
            Family::Database => (60, 120 * MINUTE, 30, 30),
            Family::Middleware => (60, 60 * MINUTE, 30, 30),
            Family::Container => (10, 30 * MINUTE, 5, 60),
            Family::AccessRule => (1, 5 * MINUTE, 5, 1),
        };
        LifecycleDefaults::new(
            PollSpec::new(Duration::from_secs(interval), Duration::from_secs(timeout)),
            RetrySpec::new(attempts, Duration::from_secs(backoff)),
        )
    }

    /// Built-in defaults with configured overrides applied. Absent or zero
    /// overrides keep the built-in value.
    pub fn defaults_with(self, overrides: &FamilyOverrides) -> LifecycleDefaults {
        let secs = |value: Option<u64>| Duration::from_secs(value.unwrap_or(0));
        let configured = LifecycleDefaults::new(
            PollSpec::new(
                secs(overrides.poll_interval_secs),
                secs(overrides.poll_timeout_secs),
            ),
            RetrySpec::new(
                overrides.delete_attempts.unwrap_or(0),
                secs(overrides.delete_backoff_secs),
            ),
        );
        let builtin = self.defaults();
        LifecycleDefaults::new(
            configured.poll.or(builtin.poll),
            configured.retry.or(builtin.retry),
        )
    }

    pub fn overrides(self, config: &LifecycleConfig) -> &FamilyOverrides {
        match self {
            Family::Database => &config.database,
            Family::Middleware => &config.middleware,
            Family::Container => &config.container,
            Family::AccessRule => &config.access_rule,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// Per-family settings shared by every operation a resource module starts
#[derive(Clone)]
pub struct LifecycleContext {
    family: Family,
    defaults: LifecycleDefaults,
    cancel: Cancellation,
    observer: Arc<dyn LifecycleObserver>,
}

impl LifecycleContext {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            defaults: family.defaults(),
            cancel: Cancellation::never(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn from_config(family: Family, config: &LifecycleConfig) -> Self {
        Self {
            defaults: family.defaults_with(family.overrides(config)),
            ..Self::new(family)
        }
    }

    /// Read overrides from the lifecycle config file, if one exists
    pub fn load(family: Family) -> Result<Self> {
        let config = opcflow_config::load_lifecycle_config()?;
        tracing::debug!("Loaded lifecycle settings for {}", family);
        Ok(Self::from_config(family, &config))
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn defaults(&self) -> LifecycleDefaults {
        self.defaults
    }

    pub(crate) fn operation(&self, name: &str) -> Operation {
        Operation::new(self.family.kind(), name, self.defaults)
            .with_cancellation(self.cancel.clone())
            .with_observer(self.observer.clone())
    }
}

impl std::fmt::Debug for LifecycleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("family", &self.family)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_are_valid() {
        for family in [
            Family::Database,
            Family::Middleware,
            Family::Container,
            Family::AccessRule,
        ] {
            let defaults = family.defaults();
            assert!(defaults.poll.validate().is_ok(), "{}", family);
            assert!(defaults.retry.validate().is_ok(), "{}", family);
        }
    }

    #[test]
    fn test_access_rule_and_database_extremes() {
        let rule = Family::AccessRule.defaults();
        assert_eq!(rule.poll.interval, Duration::from_secs(1));
        assert_eq!(rule.poll.timeout, Duration::from_secs(300));

        let db = Family::Database.defaults();
        assert_eq!(db.retry, RetrySpec::new(30, Duration::from_secs(30)));

        let container = Family::Container.defaults();
        assert_eq!(container.retry, RetrySpec::new(5, Duration::from_secs(60)));
    }

    #[test]
    fn test_overrides_applied_per_field() {
        let overrides = FamilyOverrides {
            poll_interval_secs: Some(15),
            poll_timeout_secs: Some(0),
            delete_attempts: Some(3),
            delete_backoff_secs: None,
        };

        let defaults = Family::Middleware.defaults_with(&overrides);
        assert_eq!(defaults.poll.interval, Duration::from_secs(15));
        assert_eq!(defaults.poll.timeout, Duration::from_secs(60 * MINUTE));
        assert_eq!(defaults.retry.max_attempts, 3);
        assert_eq!(defaults.retry.backoff, Duration::from_secs(30));
    }

    #[test]
    fn test_context_from_config() {
        let config = LifecycleConfig::from_yaml("container:\n  delete_attempts: 9\n").unwrap();

        let ctx = LifecycleContext::from_config(Family::Container, &config);
        assert_eq!(ctx.defaults().retry.max_attempts, 9);

        let ctx = LifecycleContext::from_config(Family::Database, &config);
        assert_eq!(ctx.defaults(), Family::Database.defaults());
    }
}
