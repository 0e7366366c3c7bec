//! Asynchronous specifications.
//!
//! An [`AsyncSpecification`] may suspend before producing its answer, for
//! conditions that need I/O. Combinators keep the synchronous short-circuit
//! laws: the right operand of an AND is not started until the left one has
//! resolved to `true`. Failures are returned as errors and never read as
//! "not satisfied".

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use themis_common::{RuleError, RuleResult};
use tokio_util::sync::CancellationToken;

use crate::specification::Specification;

/// Specification whose evaluation may suspend.
#[async_trait]
pub trait AsyncSpecification<T>: Send + Sync {
    /// Check if the specification is satisfied by the given subject.
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool>;

    /// Combine this specification with another using AND logic.
    fn and<S: AsyncSpecification<T>>(self, other: S) -> AsyncAnd<Self, S>
    where
        Self: Sized,
    {
        AsyncAnd(self, other)
    }

    /// Combine this specification with another using OR logic.
    fn or<S: AsyncSpecification<T>>(self, other: S) -> AsyncOr<Self, S>
    where
        Self: Sized,
    {
        AsyncOr(self, other)
    }

    /// Negate this specification.
    fn not(self) -> AsyncNot<Self>
    where
        Self: Sized,
    {
        AsyncNot(self)
    }

    /// Erase the concrete type.
    fn boxed(self) -> AnyAsyncSpec<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        Arc::new(self)
    }
}

/// A boxed asynchronous specification for dynamic dispatch.
pub type AnyAsyncSpec<T> = Arc<dyn AsyncSpecification<T>>;

#[async_trait]
impl<T, S> AsyncSpecification<T> for Arc<S>
where
    T: Send + Sync,
    S: AsyncSpecification<T> + ?Sized,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        self.as_ref().is_satisfied_by(subject).await
    }
}

/// AND combinator for asynchronous specifications.
#[derive(Debug, Clone)]
pub struct AsyncAnd<A, B>(pub A, pub B);

#[async_trait]
impl<T, A, B> AsyncSpecification<T> for AsyncAnd<A, B>
where
    T: Send + Sync,
    A: AsyncSpecification<T>,
    B: AsyncSpecification<T>,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        if !self.0.is_satisfied_by(subject).await? {
            return Ok(false);
        }
        self.1.is_satisfied_by(subject).await
    }
}

/// OR combinator for asynchronous specifications.
#[derive(Debug, Clone)]
pub struct AsyncOr<A, B>(pub A, pub B);

#[async_trait]
impl<T, A, B> AsyncSpecification<T> for AsyncOr<A, B>
where
    T: Send + Sync,
    A: AsyncSpecification<T>,
    B: AsyncSpecification<T>,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        if self.0.is_satisfied_by(subject).await? {
            return Ok(true);
        }
        self.1.is_satisfied_by(subject).await
    }
}

/// NOT combinator for asynchronous specifications.
#[derive(Debug, Clone)]
pub struct AsyncNot<A>(pub A);

#[async_trait]
impl<T, A> AsyncSpecification<T> for AsyncNot<A>
where
    T: Send + Sync,
    A: AsyncSpecification<T>,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        Ok(!self.0.is_satisfied_by(subject).await?)
    }
}

/// A synchronous specification used in the asynchronous algebra.
///
/// Resolves without suspending. Built with [`Specification::into_async`].
#[derive(Debug, Clone, Copy)]
pub struct Immediate<S>(pub S);

#[async_trait]
impl<T, S> AsyncSpecification<T> for Immediate<S>
where
    T: Send + Sync,
    S: Specification<T>,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        Ok(Specification::is_satisfied_by(&self.0, subject))
    }
}

type AsyncPredicate<T> = dyn Fn(T) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync;

/// Asynchronous specification backed by a closure.
///
/// The closure receives its own clone of the subject so the returned future
/// can outlive the borrow.
pub struct AsyncPredicateSpec<T> {
    predicate: Arc<AsyncPredicate<T>>,
}

impl<T: 'static> AsyncPredicateSpec<T> {
    pub fn new<F, Fut>(predicate: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self {
            predicate: Arc::new(move |subject: T| -> BoxFuture<'static, anyhow::Result<bool>> {
                Box::pin(predicate(subject))
            }),
        }
    }
}

impl<T> Clone for AsyncPredicateSpec<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for AsyncPredicateSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncPredicateSpec")
    }
}

#[async_trait]
impl<T> AsyncSpecification<T> for AsyncPredicateSpec<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn is_satisfied_by(&self, subject: &T) -> RuleResult<bool> {
        Ok((self.predicate)(subject.clone()).await?)
    }
}

/// Evaluate `spec`, giving up as soon as `token` is cancelled.
///
/// On cancellation the in-flight evaluation is dropped, releasing whatever
/// its operands held, and [`RuleError::Cancelled`] is returned.
pub async fn evaluate_cancellable<T, S>(
    spec: &S,
    subject: &T,
    token: &CancellationToken,
) -> RuleResult<bool>
where
    T: Send + Sync,
    S: AsyncSpecification<T> + ?Sized,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RuleError::Cancelled),
        result = spec.is_satisfied_by(subject) => result,
    }
}

/// Evaluate `spec` with a deadline.
pub async fn evaluate_with_timeout<T, S>(spec: &S, subject: &T, limit: Duration) -> RuleResult<bool>
where
    T: Send + Sync,
    S: AsyncSpecification<T> + ?Sized,
{
    tokio::time::timeout(limit, spec.is_satisfied_by(subject))
        .await
        .map_err(|_| RuleError::TimedOut(limit))?
}
