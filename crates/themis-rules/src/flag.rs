//! Flag and user-data predicates.

use serde_json::Value;

use crate::context::EvaluationContext;
use crate::specification::Specification;

/// Satisfied when a flag holds the expected value.
///
/// Unset flags read as `false`, so `FlagSpec::disabled` matches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    flag_key: String,
    expected: bool,
}

impl FlagSpec {
    /// Flag must be `true`
    pub fn new(flag_key: impl Into<String>) -> Self {
        Self::equals(flag_key, true)
    }

    pub fn equals(flag_key: impl Into<String>, expected: bool) -> Self {
        Self {
            flag_key: flag_key.into(),
            expected,
        }
    }

    /// Flag must be `false` or unset
    pub fn disabled(flag_key: impl Into<String>) -> Self {
        Self::equals(flag_key, false)
    }

    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    pub fn expected(&self) -> bool {
        self.expected
    }
}

impl Specification<EvaluationContext> for FlagSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        context.flag(&self.flag_key) == self.expected
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expectation {
    Present,
    Equals(Value),
}

/// Predicate over an application-defined user data entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDataSpec {
    key: String,
    expectation: Expectation,
}

impl UserDataSpec {
    /// Entry must equal `value`
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expectation: Expectation::Equals(value.into()),
        }
    }

    /// Entry must exist, whatever its value
    pub fn present(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expectation: Expectation::Present,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Specification<EvaluationContext> for UserDataSpec {
    fn is_satisfied_by(&self, context: &EvaluationContext) -> bool {
        match (&self.expectation, context.user_data(&self.key)) {
            (_, None) => false,
            (Expectation::Present, Some(_)) => true,
            (Expectation::Equals(expected), Some(actual)) => expected == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_to_true_expectation() {
        let spec = FlagSpec::new("is_premium");

        assert!(spec.is_satisfied_by(&EvaluationContext::new().with_flag("is_premium", true)));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new().with_flag("is_premium", false)));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new()));
    }

    #[test]
    fn test_disabled_matches_unset() {
        let spec = FlagSpec::disabled("maintenance");

        assert!(spec.is_satisfied_by(&EvaluationContext::new()));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new().with_flag("maintenance", true)));
        assert_eq!(spec, FlagSpec::equals("maintenance", false));
    }

    #[test]
    fn test_user_data_equals() {
        let spec = UserDataSpec::equals("subscription_tier", "premium");

        assert!(spec.is_satisfied_by(
            &EvaluationContext::new().with_user_data("subscription_tier", "premium")
        ));
        assert!(!spec.is_satisfied_by(
            &EvaluationContext::new().with_user_data("subscription_tier", "basic")
        ));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new()));
    }

    #[test]
    fn test_user_data_present() {
        let spec = UserDataSpec::present("referral_code");

        assert!(spec.is_satisfied_by(&EvaluationContext::new().with_user_data("referral_code", 42)));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new()));
    }
}
