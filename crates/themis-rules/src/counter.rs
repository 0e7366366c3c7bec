//! Counter-based predicates.
//!
//! Counters never reset on their own: a "daily" limit only means something
//! if whatever mutates the provider clears the counter once a day.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::context::EvaluationContext;
use crate::specification::Specification;

/// Comparison between a counter value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    Equal,
    GreaterThanOrEqual,
    GreaterThan,
}

impl Comparison {
    /// Applies the comparison as `value <op> threshold`.
    pub fn evaluate(self, value: u64, threshold: u64) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::LessThanOrEqual => value <= threshold,
            Comparison::Equal => value == threshold,
            Comparison::GreaterThanOrEqual => value >= threshold,
            Comparison::GreaterThan => value > threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::Equal => "==",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::GreaterThan => ">",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Satisfied while a counter stays strictly below its limit.
///
/// With a limit of `n` the guarded action can happen `n` times: the counter
/// reads `0..n` while satisfied and the rule flips once it reaches `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxCountSpec {
    counter_key: String,
    maximum_count: u64,
}

impl MaxCountSpec {
    pub fn new(counter_key: impl Into<String>, maximum_count: u64) -> Self {
        Self {
            counter_key: counter_key.into(),
            maximum_count,
        }
    }

    pub fn counter(counter_key: impl Into<String>, limit: u64) -> Self {
        Self::new(counter_key, limit)
    }

    pub fn only_once(counter_key: impl Into<String>) -> Self {
        Self::new(counter_key, 1)
    }

    pub fn only_twice(counter_key: impl Into<String>) -> Self {
        Self::new(counter_key, 2)
    }

    pub fn daily_limit(counter_key: impl Into<String>, limit: u64) -> Self {
        Self::new(counter_key, limit)
    }

    pub fn weekly_limit(counter_key: impl Into<String>, limit: u64) -> Self {
        Self::new(counter_key, limit)
    }

    pub fn monthly_limit(counter_key: impl Into<String>, limit: u64) -> Self {
        Self::new(counter_key, limit)
    }

    /// Counter `<=` `maximum_count`.
    pub fn inclusive(counter_key: impl Into<String>, maximum_count: u64) -> CounterSpec {
        CounterSpec::new(counter_key, Comparison::LessThanOrEqual, maximum_count)
    }

    /// Counter `==` `count`.
    pub fn exactly(counter_key: impl Into<String>, count: u64) -> CounterSpec {
        CounterSpec::new(counter_key, Comparison::Equal, count)
    }

    /// Counter within `range`, both bounds included.
    pub fn in_range(counter_key: impl Into<String>, range: RangeInclusive<u64>) -> CounterRangeSpec {
        CounterRangeSpec::new(counter_key, range)
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    pub fn maximum_count(&self) -> u64 {
        self.maximum_count
    }

    /// How many more times the guarded action may happen in this snapshot.
    pub fn remaining(&self, context: &EvaluationContext) -> u64 {
        self.maximum_count
            .saturating_sub(context.counter(&self.counter_key))
    }
}

impl Specification<EvaluationContext> for MaxCountSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        context.counter(&self.counter_key) < self.maximum_count
    }
}

/// Compares a counter against a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSpec {
    counter_key: String,
    comparison: Comparison,
    threshold: u64,
}

impl CounterSpec {
    pub fn new(counter_key: impl Into<String>, comparison: Comparison, threshold: u64) -> Self {
        Self {
            counter_key: counter_key.into(),
            comparison,
            threshold,
        }
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl Specification<EvaluationContext> for CounterSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        self.comparison
            .evaluate(context.counter(&self.counter_key), self.threshold)
    }
}

impl fmt::Display for CounterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.counter_key, self.comparison, self.threshold)
    }
}

/// Satisfied while a counter lies in a closed interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRangeSpec {
    counter_key: String,
    range: RangeInclusive<u64>,
}

impl CounterRangeSpec {
    pub fn new(counter_key: impl Into<String>, range: RangeInclusive<u64>) -> Self {
        Self {
            counter_key: counter_key.into(),
            range,
        }
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    pub fn range(&self) -> &RangeInclusive<u64> {
        &self.range
    }
}

impl Specification<EvaluationContext> for CounterRangeSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        self.range.contains(&context.counter(&self.counter_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_count(key: &str, value: u64) -> EvaluationContext {
        EvaluationContext::new().with_counter(key, value)
    }

    #[test]
    fn test_max_count_is_strict() {
        let spec = MaxCountSpec::new("banner_shown", 3);

        assert!(spec.is_satisfied_by(&with_count("banner_shown", 2)));
        assert!(!spec.is_satisfied_by(&with_count("banner_shown", 3)));
        assert!(!spec.is_satisfied_by(&with_count("banner_shown", 4)));
    }

    #[test]
    fn test_unset_counter_reads_as_zero() {
        let ctx = EvaluationContext::new();

        assert!(MaxCountSpec::only_once("tutorial").is_satisfied_by(&ctx));
        assert!(!MaxCountSpec::new("tutorial", 0).is_satisfied_by(&ctx));
        assert!(MaxCountSpec::exactly("tutorial", 0).is_satisfied_by(&ctx));
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(MaxCountSpec::only_once("k").maximum_count(), 1);
        assert_eq!(MaxCountSpec::only_twice("k").maximum_count(), 2);
        assert_eq!(MaxCountSpec::daily_limit("k", 5), MaxCountSpec::new("k", 5));
        assert_eq!(MaxCountSpec::weekly_limit("k", 7), MaxCountSpec::counter("k", 7));
        assert_eq!(MaxCountSpec::monthly_limit("k", 30).counter_key(), "k");
    }

    #[test]
    fn test_remaining() {
        let spec = MaxCountSpec::daily_limit("api_calls", 10);

        assert_eq!(spec.remaining(&with_count("api_calls", 4)), 6);
        assert_eq!(spec.remaining(&with_count("api_calls", 12)), 0);
    }

    #[test]
    fn test_derived_forms() {
        let inclusive = MaxCountSpec::inclusive("views", 3);
        assert!(inclusive.is_satisfied_by(&with_count("views", 3)));
        assert!(!inclusive.is_satisfied_by(&with_count("views", 4)));

        let exactly = MaxCountSpec::exactly("views", 2);
        assert!(exactly.is_satisfied_by(&with_count("views", 2)));
        assert!(!exactly.is_satisfied_by(&with_count("views", 1)));

        let range = MaxCountSpec::in_range("views", 2..=4);
        assert!(!range.is_satisfied_by(&with_count("views", 1)));
        assert!(range.is_satisfied_by(&with_count("views", 2)));
        assert!(range.is_satisfied_by(&with_count("views", 4)));
        assert!(!range.is_satisfied_by(&with_count("views", 5)));
    }

    #[test]
    fn test_derived_forms_combine_like_max_count() {
        let spec = MaxCountSpec::inclusive("views", 5).and(MaxCountSpec::in_range("views", 2..=10));

        assert!(spec.is_satisfied_by(&with_count("views", 3)));
        assert!(!spec.is_satisfied_by(&with_count("views", 1)));
        assert!(!spec.is_satisfied_by(&with_count("views", 6)));
    }

    #[test]
    fn test_comparisons() {
        let cases = [
            (Comparison::LessThan, 2, false),
            (Comparison::LessThanOrEqual, 2, true),
            (Comparison::Equal, 2, true),
            (Comparison::GreaterThanOrEqual, 2, true),
            (Comparison::GreaterThan, 2, false),
            (Comparison::GreaterThan, 1, true),
        ];

        for (comparison, threshold, expected) in cases {
            let spec = CounterSpec::new("n", comparison, threshold);
            assert_eq!(spec.is_satisfied_by(&with_count("n", 2)), expected, "{spec}");
        }
    }

    #[test]
    fn test_comparison_serde_names() {
        let json = serde_json::to_string(&Comparison::GreaterThanOrEqual).unwrap();
        assert_eq!(json, "\"greater_than_or_equal\"");
    }
}
