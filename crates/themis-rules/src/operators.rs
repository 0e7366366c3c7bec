//! Operator overloading for specification combinators.
//!
//! Wrapping specifications in [`Spec`] (or [`AsyncSpec`]) enables `&`, `|`
//! and `!`:
//!
//! ```ignore
//! let can_show = Spec(FlagSpec::new("promo_enabled")) & !Spec(MaxCountSpec::exactly("shown", 3));
//! ```

use std::ops::{BitAnd, BitOr, Not as StdNot};

use async_trait::async_trait;
use themis_common::RuleResult;

use crate::async_spec::{AsyncAnd, AsyncNot, AsyncOr, AsyncSpecification};
use crate::specification::{And, Not, Or, Specification};

/// Operator wrapper for synchronous specifications.
#[derive(Debug, Clone, Copy)]
pub struct Spec<S>(pub S);

impl<A, B> BitAnd<Spec<B>> for Spec<A> {
    type Output = Spec<And<A, B>>;

    fn bitand(self, rhs: Spec<B>) -> Self::Output {
        Spec(And(self.0, rhs.0))
    }
}

impl<A, B> BitOr<Spec<B>> for Spec<A> {
    type Output = Spec<Or<A, B>>;

    fn bitor(self, rhs: Spec<B>) -> Self::Output {
        Spec(Or(self.0, rhs.0))
    }
}

impl<A> StdNot for Spec<A> {
    type Output = Spec<Not<A>>;

    fn not(self) -> Self::Output {
        Spec(Not(self.0))
    }
}

impl<T, S> Specification<T> for Spec<S>
where
    T: ?Sized,
    S: Specification<T>,
{
    fn is_satisfied_by(&self, subject: &T) -> bool {
        self.0.is_satisfied_by(subject)
    }
}

/// Operator wrapper for asynchronous specifications.
#[derive(Debug, Clone, Copy)]
pub struct AsyncSpec<S>(pub S);

impl<A, B> BitAnd<AsyncSpec<B>> for AsyncSpec<A> {
    type Output = AsyncSpec<AsyncAnd<A, B>>;

    fn bitand(self, rhs: AsyncSpec<B>) -> Self::Output {
        AsyncSpec(AsyncAnd(self.0, rhs.0))
    }
}

impl<A, B> BitOr<AsyncSpec<B>> for AsyncSpec<A> {
    type Output = AsyncSpec<AsyncOr<A, B>>;

    fn bitor(self, rhs: AsyncSpec<B>) -> Self::Output {
        AsyncSpec(AsyncOr(self.0, rhs.0))
    }
}

impl<A> StdNot for AsyncSpec<A> {
    type Output = AsyncSpec<AsyncNot<A>>;

    fn not(self) -> Self::Output {
        AsyncSpec(AsyncNot(self.0))
    }
}

#[async_trait]
impl<T, S> AsyncSpecification<T> for AsyncSpec<S>
where
    T: Send + Sync,
    S: AsyncSpecification<T>,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        self.0.is_satisfied_by(subject).await
    }
}
