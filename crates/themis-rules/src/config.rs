//! Provider configuration
//!
//! Loads the clock settings for a [`DefaultContextProvider`] from environment
//! variables. Both settings are optional; an empty environment yields a
//! provider on the system clock that launches when it is created.
//!
//! [`DefaultContextProvider`]: crate::provider::DefaultContextProvider

use std::env;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use themis_common::time::parse_datetime;
use themis_common::{Clock, ManualClock, RuleError, RuleResult, SystemClock};

/// Pins the provider clock to an RFC 3339 instant
pub const FROZEN_TIME_ENV: &str = "THEMIS_FROZEN_TIME";

/// Overrides the launch instant used by time-since-launch rules
pub const LAUNCH_TIME_ENV: &str = "THEMIS_LAUNCH_TIME";

/// Context provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Freeze the clock at this instant (reproducing a bug report, QA builds)
    pub frozen_time: Option<DateTime<Utc>>,
    /// Launch instant; defaults to the clock's time at provider creation
    pub launch_time: Option<DateTime<Utc>>,
}

impl ProviderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> RuleResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> RuleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            frozen_time: instant_var(&lookup, FROZEN_TIME_ENV)?,
            launch_time: instant_var(&lookup, LAUNCH_TIME_ENV)?,
        })
    }

    /// Clock the provider should read
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.frozen_time {
            Some(instant) => Arc::new(ManualClock::new(instant)),
            None => Arc::new(SystemClock),
        }
    }
}

fn instant_var<F>(lookup: &F, name: &str) -> RuleResult<Option<DateTime<Utc>>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_datetime(raw.trim())
            .map(Some)
            .ok_or_else(|| RuleError::ConfigError(format!("{name} is not an RFC 3339 instant: {raw}"))),
    }
}
