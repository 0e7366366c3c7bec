//! Fluent accumulation of ad hoc rules.

use crate::specification::{AllOf, AnyOf, AnySpec, Specification};

/// Collects specifications and closures, then folds them into one composite.
///
/// `build_all` yields a spec satisfied only when every collected rule is
/// (vacuously true when empty); `build_any` one satisfied when at least one
/// is (false when empty). Both consume the builder.
pub struct SpecBuilder<T: ?Sized> {
    specs: Vec<AnySpec<T>>,
}

impl<T: ?Sized + 'static> SpecBuilder<T> {
    pub fn new() -> Self {
        Self { specs: Vec::new() }
    }

    /// Add a specification.
    pub fn with<S: Specification<T> + 'static>(mut self, spec: S) -> Self {
        self.specs.push(spec.boxed());
        self
    }

    /// Add a closure predicate.
    pub fn predicate<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.with(AnySpec::from_fn(predicate))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn build_all(self) -> AllOf<T> {
        AllOf::new(self.specs)
    }

    pub fn build_any(self) -> AnyOf<T> {
        AnyOf::new(self.specs)
    }
}

impl<T: ?Sized + 'static> Default for SpecBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvaluationContext;
    use crate::counter::MaxCountSpec;
    use crate::flag::FlagSpec;

    #[test]
    fn test_build_all() {
        let spec = SpecBuilder::new()
            .with(FlagSpec::new("onboarded"))
            .with(MaxCountSpec::only_once("survey_shown"))
            .predicate(|ctx: &EvaluationContext| ctx.counter("sessions") >= 3)
            .build_all();

        let ready = EvaluationContext::new()
            .with_flag("onboarded", true)
            .with_counter("sessions", 3);
        assert_eq!(spec.len(), 3);
        assert!(spec.is_satisfied_by(&ready));
        assert!(!spec.is_satisfied_by(&ready.clone().with_counter("survey_shown", 1)));
    }

    #[test]
    fn test_build_any() {
        let spec = SpecBuilder::new()
            .with(FlagSpec::new("is_staff"))
            .predicate(|ctx: &EvaluationContext| ctx.counter("purchases") > 10)
            .build_any();

        assert!(spec.is_satisfied_by(&EvaluationContext::new().with_counter("purchases", 11)));
        assert!(!spec.is_satisfied_by(&EvaluationContext::new()));
    }

    #[test]
    fn test_empty_folds() {
        assert!(SpecBuilder::<u8>::new().build_all().is_satisfied_by(&0));
        assert!(!SpecBuilder::<u8>::new().build_any().is_satisfied_by(&0));
    }
}
