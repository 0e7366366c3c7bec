//! Elapsed-time predicates.
//!
//! Elapsed time is always measured against the snapshot's captured
//! `current_time`, never against the wall clock at evaluation.

use std::fmt;

use chrono::Duration;
use themis_common::time::format_duration;

use crate::context::EvaluationContext;
use crate::specification::Specification;

/// Satisfied once at least `minimum_interval` has passed since an event.
///
/// An event that was never recorded counts as infinitely long ago, so the
/// first occurrence of a cooldown-guarded action is never blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSinceEventSpec {
    event_key: String,
    minimum_interval: Duration,
}

impl TimeSinceEventSpec {
    pub fn new(event_key: impl Into<String>, minimum_interval: Duration) -> Self {
        Self {
            event_key: event_key.into(),
            minimum_interval,
        }
    }

    pub fn seconds(event_key: impl Into<String>, seconds: i64) -> Self {
        Self::new(event_key, Duration::try_seconds(seconds).unwrap_or(Duration::MAX))
    }

    pub fn minutes(event_key: impl Into<String>, minutes: i64) -> Self {
        Self::new(event_key, Duration::try_minutes(minutes).unwrap_or(Duration::MAX))
    }

    pub fn hours(event_key: impl Into<String>, hours: i64) -> Self {
        Self::new(event_key, Duration::try_hours(hours).unwrap_or(Duration::MAX))
    }

    pub fn days(event_key: impl Into<String>, days: i64) -> Self {
        Self::new(event_key, Duration::try_days(days).unwrap_or(Duration::MAX))
    }

    pub fn event_key(&self) -> &str {
        &self.event_key
    }

    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// Time left until this is satisfied; zero when it already is.
    pub fn remaining(&self, context: &EvaluationContext) -> Duration {
        match context.time_since_event(&self.event_key) {
            Some(elapsed) if elapsed < self.minimum_interval => self
                .minimum_interval
                .checked_sub(&elapsed)
                .unwrap_or(Duration::MAX),
            _ => Duration::zero(),
        }
    }
}

impl Specification<EvaluationContext> for TimeSinceEventSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        match context.time_since_event(&self.event_key) {
            None => true,
            Some(elapsed) => elapsed >= self.minimum_interval,
        }
    }
}

/// Cooldown between occurrences of an event.
///
/// Same rule as [`TimeSinceEventSpec`], with unit constructors and a
/// human-readable rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownIntervalSpec {
    inner: TimeSinceEventSpec,
}

impl CooldownIntervalSpec {
    pub fn new(event_key: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            inner: TimeSinceEventSpec::new(event_key, cooldown),
        }
    }

    pub fn seconds(event_key: impl Into<String>, seconds: i64) -> Self {
        Self {
            inner: TimeSinceEventSpec::seconds(event_key, seconds),
        }
    }

    pub fn minutes(event_key: impl Into<String>, minutes: i64) -> Self {
        Self {
            inner: TimeSinceEventSpec::minutes(event_key, minutes),
        }
    }

    pub fn hours(event_key: impl Into<String>, hours: i64) -> Self {
        Self {
            inner: TimeSinceEventSpec::hours(event_key, hours),
        }
    }

    pub fn days(event_key: impl Into<String>, days: i64) -> Self {
        Self {
            inner: TimeSinceEventSpec::days(event_key, days),
        }
    }

    pub fn event_key(&self) -> &str {
        self.inner.event_key()
    }

    pub fn cooldown(&self) -> Duration {
        self.inner.minimum_interval()
    }

    /// Time left until the cooldown ends; zero when ready.
    pub fn remaining(&self, context: &EvaluationContext) -> Duration {
        self.inner.remaining(context)
    }
}

impl Specification<EvaluationContext> for CooldownIntervalSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        self.inner.is_satisfied_by(context)
    }
}

impl From<CooldownIntervalSpec> for TimeSinceEventSpec {
    fn from(spec: CooldownIntervalSpec) -> Self {
        spec.inner
    }
}

impl fmt::Display for CooldownIntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cooldown of {}",
            self.event_key(),
            format_duration(self.cooldown())
        )
    }
}

/// Satisfied once the provider has been running for `minimum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSinceLaunchSpec {
    minimum: Duration,
}

impl TimeSinceLaunchSpec {
    pub fn new(minimum: Duration) -> Self {
        Self { minimum }
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::new(Duration::try_seconds(seconds).unwrap_or(Duration::MAX))
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::new(Duration::try_minutes(minutes).unwrap_or(Duration::MAX))
    }

    pub fn minimum(&self) -> Duration {
        self.minimum
    }
}

impl Specification<EvaluationContext> for TimeSinceLaunchSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        context.time_since_launch() >= self.minimum
    }
}
