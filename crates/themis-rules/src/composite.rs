//! Ready-made rules for common engagement patterns.
//!
//! Each returns a type-erased spec over [`EvaluationContext`], built from the
//! counter and elapsed-time predicates. The keys they read are exposed as
//! constants so callers record against the same names.

use chrono::Duration;

use crate::context::EvaluationContext;
use crate::counter::{Comparison, CounterSpec, MaxCountSpec};
use crate::flag::FlagSpec;
use crate::specification::{AnySpec, Specification};
use crate::temporal::{CooldownIntervalSpec, TimeSinceLaunchSpec};

pub const BANNER_SHOWN: &str = "banner_shown";
pub const LAST_BANNER: &str = "last_banner";
pub const RATING_PROMPT_SHOWN: &str = "rating_prompt_shown";
pub const LAST_RATING_PROMPT: &str = "last_rating_prompt";
pub const SESSIONS: &str = "sessions";

/// Promo banner: ten seconds after launch, at most three showings, one day apart.
pub fn promo_banner() -> AnySpec<EvaluationContext> {
    promo_banner_with(3, Duration::days(1))
}

pub fn promo_banner_with(max_shows: u64, cooldown: Duration) -> AnySpec<EvaluationContext> {
    TimeSinceLaunchSpec::seconds(10)
        .and(MaxCountSpec::new(BANNER_SHOWN, max_shows))
        .and(CooldownIntervalSpec::new(LAST_BANNER, cooldown))
        .boxed()
}

/// Rating prompt: an established user, asked at most three times, 90 days apart.
///
/// "Established" means five sessions and at least ten minutes into this one.
pub fn rating_prompt() -> AnySpec<EvaluationContext> {
    CounterSpec::new(SESSIONS, Comparison::GreaterThanOrEqual, 5)
        .and(TimeSinceLaunchSpec::minutes(10))
        .and(MaxCountSpec::new(RATING_PROMPT_SHOWN, 3))
        .and(CooldownIntervalSpec::days(LAST_RATING_PROMPT, 90))
        .boxed()
}

/// Feature gate on `flag`, optionally also requiring five sessions.
pub fn feature_gate(flag: &str, requires_engagement: bool) -> AnySpec<EvaluationContext> {
    let gate = FlagSpec::new(flag);
    if requires_engagement {
        gate.and(CounterSpec::new(SESSIONS, Comparison::GreaterThanOrEqual, 5))
            .boxed()
    } else {
        gate.boxed()
    }
}

/// At most `max_per_hour` uses of `action`, counted in `<action>_hourly`.
///
/// The counter has to be cleared hourly by whoever owns the provider.
pub fn rate_limit(action: &str, max_per_hour: u64) -> AnySpec<EvaluationContext> {
    MaxCountSpec::new(format!("{action}_hourly"), max_per_hour).boxed()
}
