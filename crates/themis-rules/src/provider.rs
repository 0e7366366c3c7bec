//! Context providers.
//!
//! A provider owns live counters, flags, events and user data and hands out
//! [`EvaluationContext`] snapshots. Every operation on
//! [`DefaultContextProvider`] runs under one provider-wide lock: increments
//! are atomic read-modify-writes and a snapshot never observes half of an
//! operation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use themis_common::{Clock, SystemClock};

use crate::config::ProviderConfig;
use crate::context::EvaluationContext;

/// Anything that can produce evaluation snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait ContextProvider: Send + Sync {
    /// Take a snapshot of the current state.
    fn current_context(&self) -> EvaluationContext;
}

impl<P: ContextProvider + ?Sized> ContextProvider for Arc<P> {
    fn current_context(&self) -> EvaluationContext {
        self.as_ref().current_context()
    }
}

/// Live state guarded by the provider lock.
#[derive(Debug, Default)]
struct ProviderState {
    counters: HashMap<String, u64>,
    flags: HashMap<String, bool>,
    events: HashMap<String, DateTime<Utc>>,
    user_data: HashMap<String, Value>,
}

impl ProviderState {
    fn set_counter(&mut self, key: &str, value: u64) {
        self.counters.insert(key.to_string(), value);
        tracing::trace!(key, value, "counter set");
    }

    fn add_to_counter(&mut self, key: &str, by: u64) -> u64 {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter = counter.saturating_add(by);
        tracing::trace!(key, value = *counter, "counter incremented");
        *counter
    }

    fn subtract_from_counter(&mut self, key: &str, by: u64) -> u64 {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter = counter.saturating_sub(by);
        tracing::trace!(key, value = *counter, "counter decremented");
        *counter
    }

    fn set_flag(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
        tracing::trace!(key, value, "flag set");
    }

    fn toggle_flag(&mut self, key: &str) -> bool {
        let flag = self.flags.entry(key.to_string()).or_insert(false);
        *flag = !*flag;
        tracing::trace!(key, value = *flag, "flag toggled");
        *flag
    }

    fn record_event(&mut self, key: &str, at: DateTime<Utc>) {
        self.events.insert(key.to_string(), at);
        tracing::trace!(key, at = %at, "event recorded");
    }

    fn remove_event(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.events.remove(key)
    }

    fn set_user_data(&mut self, key: &str, value: Value) {
        self.user_data.insert(key.to_string(), value);
        tracing::trace!(key, "user data set");
    }
}

static SHARED: LazyLock<Arc<DefaultContextProvider>> =
    LazyLock::new(|| Arc::new(DefaultContextProvider::new()));

/// Thread-safe in-memory provider.
///
/// Create one per application (see [`DefaultContextProvider::shared`]) or
/// one per test for isolation.
pub struct DefaultContextProvider {
    state: Mutex<ProviderState>,
    clock: Arc<dyn Clock>,
    launch_time: DateTime<Utc>,
}

impl DefaultContextProvider {
    /// Provider on the system clock, launched now.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Provider reading time from `clock`; launch time is the clock's current instant.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let launch_time = clock.now();
        Self {
            state: Mutex::new(ProviderState::default()),
            clock,
            launch_time,
        }
    }

    /// Provider set up from configuration.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let clock = config.clock();
        let launch_time = config.launch_time.unwrap_or_else(|| clock.now());
        tracing::debug!(launch_time = %launch_time, frozen = config.frozen_time.is_some(), "context provider created");
        Self {
            state: Mutex::new(ProviderState::default()),
            clock,
            launch_time,
        }
    }

    /// Process-wide instance, created on first use.
    ///
    /// Hand the returned `Arc` to the code that needs it rather than calling
    /// this from deep inside business logic, so tests can inject their own.
    pub fn shared() -> Arc<DefaultContextProvider> {
        Arc::clone(&SHARED)
    }

    pub fn launch_time(&self) -> DateTime<Utc> {
        self.launch_time
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ---- counters ----------------------------------------------------------

    pub fn set_counter(&self, key: &str, value: u64) {
        self.state.lock().set_counter(key, value);
    }

    /// Increments by one and returns the new value.
    pub fn increment_counter(&self, key: &str) -> u64 {
        self.increment_counter_by(key, 1)
    }

    /// Increments by `by` (saturating) and returns the new value.
    pub fn increment_counter_by(&self, key: &str, by: u64) -> u64 {
        self.state.lock().add_to_counter(key, by)
    }

    /// Decrements by `by`, stopping at zero, and returns the new value.
    pub fn decrement_counter(&self, key: &str, by: u64) -> u64 {
        self.state.lock().subtract_from_counter(key, by)
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.state.lock().counters.get(key).copied().unwrap_or(0)
    }

    pub fn clear_counters(&self) {
        self.state.lock().counters.clear();
        tracing::debug!("counters cleared");
    }

    // ---- flags -------------------------------------------------------------

    pub fn set_flag(&self, key: &str, value: bool) {
        self.state.lock().set_flag(key, value);
    }

    /// Flips the flag (unset counts as false) and returns the new value.
    pub fn toggle_flag(&self, key: &str) -> bool {
        self.state.lock().toggle_flag(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.state.lock().flags.get(key).copied().unwrap_or(false)
    }

    pub fn clear_flags(&self) {
        self.state.lock().flags.clear();
        tracing::debug!("flags cleared");
    }

    // ---- events ------------------------------------------------------------

    /// Records the event at the provider clock's current instant.
    pub fn record_event(&self, key: &str) -> DateTime<Utc> {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.record_event(key, now);
        now
    }

    pub fn record_event_at(&self, key: &str, at: DateTime<Utc>) {
        self.state.lock().record_event(key, at);
    }

    /// Forgets the event; it reads as never recorded afterwards.
    pub fn remove_event(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.lock().remove_event(key)
    }

    pub fn event(&self, key: &str) -> Option<DateTime<Utc>> {
        self.state.lock().events.get(key).copied()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
        tracing::debug!("events cleared");
    }

    // ---- user data ---------------------------------------------------------

    pub fn set_user_data(&self, key: &str, value: impl Into<Value>) {
        self.state.lock().set_user_data(key, value.into());
    }

    pub fn remove_user_data(&self, key: &str) -> Option<Value> {
        self.state.lock().user_data.remove(key)
    }

    pub fn clear_user_data(&self) {
        self.state.lock().user_data.clear();
        tracing::debug!("user data cleared");
    }

    /// Resets every counter, flag, event and user data entry.
    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        *state = ProviderState::default();
        tracing::debug!("provider state cleared");
    }

    /// Applies several mutations under a single lock acquisition.
    ///
    /// No snapshot can observe some of the mutations without the others.
    /// Events recorded through the transaction share one timestamp.
    ///
    /// # Deadlocks
    ///
    /// The provider lock is held while `apply` runs and is not reentrant.
    /// Calling back into this provider from `apply` (`current_context`,
    /// `counter`, any mutation) blocks forever; read through the
    /// [`ProviderTransaction`] getters instead.
    pub fn transaction<R>(&self, apply: impl FnOnce(&mut ProviderTransaction<'_>) -> R) -> R {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let mut tx = ProviderTransaction {
            state: &mut state,
            now,
        };
        apply(&mut tx)
    }
}

impl Default for DefaultContextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultContextProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultContextProvider")
            .field("clock", &self.clock)
            .field("launch_time", &self.launch_time)
            .finish_non_exhaustive()
    }
}

impl ContextProvider for DefaultContextProvider {
    fn current_context(&self) -> EvaluationContext {
        let state = self.state.lock();
        let now = self.clock.now();
        tracing::trace!(
            counters = state.counters.len(),
            flags = state.flags.len(),
            events = state.events.len(),
            "snapshot taken"
        );
        EvaluationContext::from_parts(
            state.counters.clone(),
            state.flags.clone(),
            state.events.clone(),
            state.user_data.clone(),
            now,
            self.launch_time,
        )
    }
}

/// Mutation handle passed to [`DefaultContextProvider::transaction`].
pub struct ProviderTransaction<'a> {
    state: &'a mut ProviderState,
    now: DateTime<Utc>,
}

impl ProviderTransaction<'_> {
    pub fn set_counter(&mut self, key: &str, value: u64) {
        self.state.set_counter(key, value);
    }

    pub fn increment_counter(&mut self, key: &str) -> u64 {
        self.state.add_to_counter(key, 1)
    }

    pub fn increment_counter_by(&mut self, key: &str, by: u64) -> u64 {
        self.state.add_to_counter(key, by)
    }

    pub fn decrement_counter(&mut self, key: &str, by: u64) -> u64 {
        self.state.subtract_from_counter(key, by)
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.state.counters.get(key).copied().unwrap_or(0)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.state.set_flag(key, value);
    }

    pub fn toggle_flag(&mut self, key: &str) -> bool {
        self.state.toggle_flag(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.state.flags.get(key).copied().unwrap_or(false)
    }

    /// Records the event at the transaction's timestamp.
    pub fn record_event(&mut self, key: &str) -> DateTime<Utc> {
        self.state.record_event(key, self.now);
        self.now
    }

    pub fn remove_event(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.state.remove_event(key)
    }

    pub fn set_user_data(&mut self, key: &str, value: impl Into<Value>) {
        self.state.set_user_data(key, value.into());
    }
}

/// Provider that always returns the same snapshot.
///
/// Useful in tests that build the exact context they want; it also counts
/// how many snapshots were requested.
#[derive(Debug, Default)]
pub struct StaticContextProvider {
    context: Mutex<EvaluationContext>,
    requests: AtomicUsize,
}

impl StaticContextProvider {
    pub fn new(context: EvaluationContext) -> Self {
        Self {
            context: Mutex::new(context),
            requests: AtomicUsize::new(0),
        }
    }

    /// Replaces the snapshot handed out from now on.
    pub fn set_context(&self, context: EvaluationContext) {
        *self.context.lock() = context;
    }

    /// Derives a new snapshot from the current one.
    ///
    /// # Deadlocks
    ///
    /// `change` runs with the snapshot lock held. It must not call back into
    /// this provider; use the snapshot it is given.
    pub fn update(&self, change: impl FnOnce(EvaluationContext) -> EvaluationContext) {
        let mut context = self.context.lock();
        *context = change(context.clone());
    }

    /// Number of `current_context` calls so far.
    pub fn context_request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl ContextProvider for StaticContextProvider {
    fn current_context(&self) -> EvaluationContext {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.context.lock().clone()
    }
}
