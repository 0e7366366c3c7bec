//! Evaluation context snapshots.
//!
//! An [`EvaluationContext`] is an immutable snapshot of counters, flags,
//! event timestamps and user data, taken together with the instant it was
//! captured. All elapsed-time predicates measure against that captured
//! instant, so evaluating the same snapshot twice always gives the same answer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use themis_common::RuleResult;
use themis_common::time::now_utc;

/// Snapshot of provider state used to evaluate specifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    #[serde(default)]
    counters: HashMap<String, u64>,

    #[serde(default)]
    flags: HashMap<String, bool>,

    /// Last time each event was recorded
    #[serde(default)]
    events: HashMap<String, DateTime<Utc>>,

    /// Instant the snapshot was taken
    current_time: DateTime<Utc>,

    /// Instant the owning provider (or process) started
    launch_time: DateTime<Utc>,

    #[serde(default)]
    user_data: HashMap<String, Value>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    /// Empty context captured now.
    pub fn new() -> Self {
        Self::at(now_utc())
    }

    /// Empty context captured at `instant`; launch time is the same instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            counters: HashMap::new(),
            flags: HashMap::new(),
            events: HashMap::new(),
            current_time: instant,
            launch_time: instant,
            user_data: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(
        counters: HashMap<String, u64>,
        flags: HashMap<String, bool>,
        events: HashMap<String, DateTime<Utc>>,
        user_data: HashMap<String, Value>,
        current_time: DateTime<Utc>,
        launch_time: DateTime<Utc>,
    ) -> Self {
        Self {
            counters,
            flags,
            events,
            current_time,
            launch_time,
            user_data,
        }
    }

    /// Sets a counter value.
    pub fn with_counter(mut self, key: impl Into<String>, value: u64) -> Self {
        self.counters.insert(key.into(), value);
        self
    }

    /// Sets a flag value.
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    /// Records an event at the given instant.
    pub fn with_event(mut self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.events.insert(key.into(), at);
        self
    }

    /// Adds a user data entry.
    pub fn with_user_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_data.insert(key.into(), value.into());
        self
    }

    pub fn with_current_time(mut self, current_time: DateTime<Utc>) -> Self {
        self.current_time = current_time;
        self
    }

    pub fn with_launch_time(mut self, launch_time: DateTime<Utc>) -> Self {
        self.launch_time = launch_time;
        self
    }

    /// Counter value; unset counters read as 0.
    pub fn counter(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Flag value; unset flags read as false.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Last time the event was recorded, `None` if never.
    pub fn event(&self, key: &str) -> Option<DateTime<Utc>> {
        self.events.get(key).copied()
    }

    pub fn user_data(&self, key: &str) -> Option<&Value> {
        self.user_data.get(key)
    }

    /// User data deserialized into `D`.
    ///
    /// Missing keys and values of another shape both read as `None`.
    pub fn user_data_as<D: DeserializeOwned>(&self, key: &str) -> Option<D> {
        let value = self.user_data.get(key)?;
        D::deserialize(value).ok()
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    pub fn launch_time(&self) -> DateTime<Utc> {
        self.launch_time
    }

    /// Time elapsed between the event and this snapshot, `None` if never recorded.
    pub fn time_since_event(&self, key: &str) -> Option<Duration> {
        self.event(key).map(|at| self.current_time - at)
    }

    /// Time elapsed between launch and this snapshot.
    pub fn time_since_launch(&self) -> Duration {
        self.current_time - self.launch_time
    }

    pub fn counters(&self) -> &HashMap<String, u64> {
        &self.counters
    }

    pub fn flags(&self) -> &HashMap<String, bool> {
        &self.flags
    }

    pub fn events(&self) -> &HashMap<String, DateTime<Utc>> {
        &self.events
    }

    /// Serializes the snapshot to JSON.
    pub fn to_json(&self) -> RuleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themis_common::time::parse_datetime;

    fn create_test_context() -> EvaluationContext {
        let now = parse_datetime("2025-03-01T12:00:00Z").unwrap();
        EvaluationContext::at(now)
            .with_launch_time(now - Duration::seconds(90))
            .with_counter("loginAttempts", 3)
            .with_flag("isPremium", true)
            .with_event("last_login", now - Duration::hours(2))
            .with_user_data("subscription_tier", "basic")
            .with_user_data("seats", 4)
    }

    #[test]
    fn test_counter_and_flag_defaults() {
        let ctx = create_test_context();

        assert_eq!(ctx.counter("loginAttempts"), 3);
        assert_eq!(ctx.counter("missing"), 0);
        assert!(ctx.flag("isPremium"));
        assert!(!ctx.flag("nonexistent"));
        assert_eq!(ctx.event("never"), None);
    }

    #[test]
    fn test_elapsed_times() {
        let ctx = create_test_context();

        assert_eq!(ctx.time_since_event("last_login"), Some(Duration::hours(2)));
        assert_eq!(ctx.time_since_event("never"), None);
        assert_eq!(ctx.time_since_launch(), Duration::seconds(90));
    }

    #[test]
    fn test_user_data_typed_access() {
        let ctx = create_test_context();

        assert_eq!(
            ctx.user_data_as::<String>("subscription_tier"),
            Some("basic".to_string())
        );
        assert_eq!(ctx.user_data_as::<u32>("seats"), Some(4));
        assert_eq!(ctx.user_data_as::<u32>("subscription_tier"), None);
        assert_eq!(ctx.user_data_as::<u32>("missing"), None);
    }

    #[test]
    fn test_json_roundtrip_preserves_snapshot() {
        let ctx = create_test_context();
        let json = ctx.to_json().unwrap();
        assert_eq!(EvaluationContext::from_json(&json).unwrap(), ctx);
    }

    #[test]
    fn test_json_missing_maps_default_to_empty() {
        let json = r#"{
            "current_time": "2025-03-01T12:00:00Z",
            "launch_time": "2025-03-01T11:00:00Z"
        }"#;
        let ctx = EvaluationContext::from_json(json).unwrap();
        assert_eq!(ctx.counter("anything"), 0);
        assert_eq!(ctx.time_since_launch(), Duration::hours(1));
    }
}
