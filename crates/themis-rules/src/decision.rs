//! First-match decisions.
//!
//! Cases are checked in declaration order and the first satisfied one wins;
//! later cases are never evaluated once a match is found.

use std::fmt;

use crate::specification::{AnySpec, Specification};

/// Maps a subject to an optional typed decision.
pub trait DecisionSpec<T: ?Sized, V>: Send + Sync {
    /// The decision for `subject`, or `None` when no rule applies.
    fn decision(&self, subject: &T) -> Option<V>;
}

/// Ordered (specification, value) cases without a fallback.
pub struct FirstMatchCases<T: ?Sized, V> {
    cases: Vec<(AnySpec<T>, V)>,
}

impl<T: ?Sized + 'static, V> FirstMatchCases<T, V> {
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Appends a case; it ranks below every case added before it.
    pub fn when<S: Specification<T> + 'static>(mut self, spec: S, value: V) -> Self {
        self.cases.push((spec.boxed(), value));
        self
    }

    /// Attach a fallback value, making the decision total.
    pub fn with_fallback(self, fallback: V) -> FirstMatchSpec<T, V> {
        FirstMatchSpec {
            cases: self.cases,
            fallback,
        }
    }
}

impl<T: ?Sized, V> FirstMatchCases<T, V> {
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Index of the first satisfied case.
    pub fn matched_case(&self, subject: &T) -> Option<usize> {
        matched_index(&self.cases, subject)
    }
}

impl<T: ?Sized + 'static, V> Default for FirstMatchCases<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, V> From<Vec<(AnySpec<T>, V)>> for FirstMatchCases<T, V> {
    fn from(cases: Vec<(AnySpec<T>, V)>) -> Self {
        Self { cases }
    }
}

impl<T: ?Sized, V: Clone + Send + Sync> DecisionSpec<T, V> for FirstMatchCases<T, V> {
    fn decision(&self, subject: &T) -> Option<V> {
        self.matched_case(subject)
            .map(|index| self.cases[index].1.clone())
    }
}

impl<T: ?Sized, V: fmt::Debug> fmt::Debug for FirstMatchCases<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.cases.iter().map(|(_, value)| value))
            .finish()
    }
}

/// Priority routing from satisfied specifications to values.
///
/// Returns the value of the first satisfied case, or the fallback when
/// nothing matches. An empty case list always yields the fallback.
pub struct FirstMatchSpec<T: ?Sized, V> {
    cases: Vec<(AnySpec<T>, V)>,
    fallback: V,
}

impl<T: ?Sized, V> FirstMatchSpec<T, V> {
    pub fn new(cases: Vec<(AnySpec<T>, V)>, fallback: V) -> Self {
        Self { cases, fallback }
    }

    pub fn fallback(&self) -> &V {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Index of the first satisfied case, `None` if the fallback applies.
    pub fn matched_case(&self, subject: &T) -> Option<usize> {
        matched_index(&self.cases, subject)
    }

    /// Borrowing form of [`FirstMatchSpec::decide`].
    pub fn decide_ref(&self, subject: &T) -> &V {
        match self.matched_case(subject) {
            Some(index) => &self.cases[index].1,
            None => &self.fallback,
        }
    }
}

impl<T: ?Sized, V: Clone> FirstMatchSpec<T, V> {
    pub fn decide(&self, subject: &T) -> V {
        self.decide_ref(subject).clone()
    }
}

impl<T: ?Sized, V: Clone + Send + Sync> DecisionSpec<T, V> for FirstMatchSpec<T, V> {
    fn decision(&self, subject: &T) -> Option<V> {
        Some(self.decide(subject))
    }
}

impl<T: ?Sized, V: fmt::Debug> fmt::Debug for FirstMatchSpec<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstMatchSpec")
            .field("cases", &self.cases.iter().map(|(_, v)| v).collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

fn matched_index<T: ?Sized, V>(cases: &[(AnySpec<T>, V)], subject: &T) -> Option<usize> {
    let matched = cases
        .iter()
        .position(|(spec, _)| spec.is_satisfied_by(subject));
    tracing::debug!(cases = cases.len(), matched = ?matched, "first-match resolved");
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::context::EvaluationContext;
    use crate::flag::FlagSpec;

    fn tiers() -> FirstMatchSpec<EvaluationContext, &'static str> {
        FirstMatchCases::new()
            .when(FlagSpec::new("is_premium"), "premium")
            .when(FlagSpec::new("is_basic"), "basic")
            .with_fallback("free")
    }

    #[test]
    fn test_first_satisfied_case_wins() {
        let ctx = EvaluationContext::new()
            .with_flag("is_premium", false)
            .with_flag("is_basic", true);

        assert_eq!(tiers().decide(&ctx), "basic");
        assert_eq!(tiers().matched_case(&ctx), Some(1));
    }

    #[test]
    fn test_earlier_case_beats_later_match() {
        let ctx = EvaluationContext::new()
            .with_flag("is_premium", true)
            .with_flag("is_basic", true);

        assert_eq!(tiers().decide(&ctx), "premium");
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let ctx = EvaluationContext::new();
        assert_eq!(tiers().decide(&ctx), "free");
        assert_eq!(tiers().matched_case(&ctx), None);
        assert_eq!(tiers().decision(&ctx), Some("free"));
    }

    #[test]
    fn test_empty_cases_yield_fallback() {
        let spec: FirstMatchSpec<u32, u8> = FirstMatchSpec::new(Vec::new(), 9);
        assert!(spec.is_empty());
        assert_eq!(spec.decide(&1), 9);
    }

    #[test]
    fn test_cases_without_fallback() {
        let cases: FirstMatchCases<u32, &str> = FirstMatchCases::new()
            .when(AnySpec::from_fn(|n: &u32| *n >= 100), "bulk")
            .when(AnySpec::from_fn(|n: &u32| *n >= 10), "volume");

        assert_eq!(cases.decision(&150), Some("bulk"));
        assert_eq!(cases.decision(&20), Some("volume"));
        assert_eq!(cases.decision(&3), None);
    }

    #[test]
    fn test_later_cases_not_evaluated_after_match() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&evaluated);

        let spec = FirstMatchSpec::new(
            vec![
                (AnySpec::always(), 1),
                (
                    AnySpec::from_fn(move |_: &u32| {
                        seen.fetch_add(1, Ordering::SeqCst);
                        true
                    }),
                    2,
                ),
            ],
            0,
        );

        assert_eq!(spec.decide(&5), 1);
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }
}
