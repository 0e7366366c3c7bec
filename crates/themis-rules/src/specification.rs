//! Core Specification trait and combinators.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::async_spec::Immediate;

/// Core specification trait for composable business rules.
///
/// A specification is a pure predicate over a subject. Combinators are
/// specifications themselves, so rules nest arbitrarily deep.
pub trait Specification<T: ?Sized>: Send + Sync {
    /// Check if the specification is satisfied by the given subject.
    fn is_satisfied_by(&self, subject: &T) -> bool;

    /// Combine this specification with another using AND logic.
    fn and<S: Specification<T>>(self, other: S) -> And<Self, S>
    where
        Self: Sized,
    {
        And(self, other)
    }

    /// Combine this specification with another using OR logic.
    fn or<S: Specification<T>>(self, other: S) -> Or<Self, S>
    where
        Self: Sized,
    {
        Or(self, other)
    }

    /// Negate this specification.
    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }

    /// Erase the concrete type so it can be stored next to other specifications.
    fn boxed(self) -> AnySpec<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        AnySpec::new(self)
    }

    /// Use this specification where an asynchronous one is expected.
    fn into_async(self) -> Immediate<Self>
    where
        Self: Sized,
    {
        Immediate(self)
    }
}

/// AND combinator. The right operand is skipped when the left one fails.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(pub A, pub B);

impl<T, A, B> Specification<T> for And<A, B>
where
    T: ?Sized,
    A: Specification<T>,
    B: Specification<T>,
{
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.0.is_satisfied_by(subject) && self.1.is_satisfied_by(subject)
    }
}

/// OR combinator. The right operand is skipped when the left one holds.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(pub A, pub B);

impl<T, A, B> Specification<T> for Or<A, B>
where
    T: ?Sized,
    A: Specification<T>,
    B: Specification<T>,
{
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.0.is_satisfied_by(subject) || self.1.is_satisfied_by(subject)
    }
}

/// NOT combinator.
#[derive(Debug, Clone, Copy)]
pub struct Not<A>(pub A);

impl<T, A> Specification<T> for Not<A>
where
    T: ?Sized,
    A: Specification<T>,
{
    fn is_satisfied_by(&self, subject: &T) -> bool {
        !self.0.is_satisfied_by(subject)
    }
}

/// A specification that always returns true.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysTrue;

impl<T: ?Sized> Specification<T> for AlwaysTrue {
    fn is_satisfied_by(&self, _subject: &T) -> bool {
        true
    }
}

/// A specification that always returns false.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysFalse;

impl<T: ?Sized> Specification<T> for AlwaysFalse {
    fn is_satisfied_by(&self, _subject: &T) -> bool {
        false
    }
}

/// Wraps a closure as a specification.
pub struct PredicateSpec<T: ?Sized, F> {
    predicate: F,
    _subject: PhantomData<fn(&T)>,
}

impl<T: ?Sized, F> PredicateSpec<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _subject: PhantomData,
        }
    }
}

impl<T: ?Sized, F> Specification<T> for PredicateSpec<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, subject: &T) -> bool {
        (self.predicate)(subject)
    }
}

impl<T: ?Sized, F: Clone> Clone for PredicateSpec<T, F> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            _subject: PhantomData,
        }
    }
}

impl<T: ?Sized, F> fmt::Debug for PredicateSpec<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateSpec")
    }
}

/// Type-erased specification for heterogeneous storage.
///
/// Cloning is cheap; clones share the wrapped specification.
pub struct AnySpec<T: ?Sized> {
    inner: Arc<dyn Specification<T>>,
}

impl<T: ?Sized + 'static> AnySpec<T> {
    /// Erase any specification
    pub fn new<S: Specification<T> + 'static>(spec: S) -> Self {
        Self {
            inner: Arc::new(spec),
        }
    }

    /// Erase a closure
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(PredicateSpec::new(predicate))
    }

    /// Satisfied by every subject
    pub fn always() -> Self {
        Self::new(AlwaysTrue)
    }

    /// Satisfied by no subject
    pub fn never() -> Self {
        Self::new(AlwaysFalse)
    }
}

impl<T: ?Sized> Specification<T> for AnySpec<T> {
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.inner.is_satisfied_by(subject)
    }

    fn boxed(self) -> AnySpec<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        self
    }
}

impl<T: ?Sized> Clone for AnySpec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized> fmt::Debug for AnySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnySpec")
    }
}

impl<T: ?Sized, S: Specification<T> + ?Sized> Specification<T> for Arc<S> {
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.as_ref().is_satisfied_by(subject)
    }
}

impl<T: ?Sized, S: Specification<T> + ?Sized> Specification<T> for Box<S> {
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.as_ref().is_satisfied_by(subject)
    }
}

/// All specifications in the collection must be satisfied.
///
/// Evaluates in order and stops at the first failure; empty is satisfied.
#[derive(Debug, Clone)]
pub struct AllOf<T: ?Sized> {
    specs: Vec<AnySpec<T>>,
}

impl<T: ?Sized> AllOf<T> {
    pub fn new(specs: Vec<AnySpec<T>>) -> Self {
        AllOf { specs }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<T: ?Sized> Specification<T> for AllOf<T> {
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.specs.iter().all(|spec| spec.is_satisfied_by(subject))
    }
}

/// Any specification in the collection must be satisfied.
///
/// Evaluates in order and stops at the first success; empty is unsatisfied.
#[derive(Debug, Clone)]
pub struct AnyOf<T: ?Sized> {
    specs: Vec<AnySpec<T>>,
}

impl<T: ?Sized> AnyOf<T> {
    pub fn new(specs: Vec<AnySpec<T>>) -> Self {
        AnyOf { specs }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<T: ?Sized> Specification<T> for AnyOf<T> {
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.specs.iter().any(|spec| spec.is_satisfied_by(subject))
    }
}

/// Folds over iterators of type-erased specifications.
pub trait SpecIteratorExt<T: ?Sized>: Iterator<Item = AnySpec<T>> + Sized {
    /// Satisfied when every specification is satisfied
    fn all_satisfied(self) -> AllOf<T> {
        AllOf::new(self.collect())
    }

    /// Satisfied when at least one specification is satisfied
    fn any_satisfied(self) -> AnyOf<T> {
        AnyOf::new(self.collect())
    }
}

impl<T: ?Sized, I> SpecIteratorExt<T> for I where I: Iterator<Item = AnySpec<T>> {}
