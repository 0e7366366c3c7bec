//! Provider bindings.
//!
//! Small adapters pairing a [`ContextProvider`] with a rule. Every read takes
//! a fresh snapshot, so the value always reflects the provider's current
//! state; nothing is cached between reads.

use std::fmt;
use std::sync::Arc;

use themis_common::RuleResult;
use tokio_util::sync::CancellationToken;

use crate::async_spec::{AnyAsyncSpec, AsyncSpecification, Immediate, evaluate_cancellable};
use crate::builder::SpecBuilder;
use crate::context::EvaluationContext;
use crate::decision::DecisionSpec;
use crate::provider::ContextProvider;
use crate::specification::{AnySpec, Specification};

/// Evaluate `spec` against a fresh snapshot from `provider`.
pub fn evaluate<P, S>(provider: &P, spec: &S) -> bool
where
    P: ContextProvider + ?Sized,
    S: Specification<EvaluationContext> + ?Sized,
{
    let context = provider.current_context();
    spec.is_satisfied_by(&context)
}

/// Evaluate an asynchronous `spec` against a fresh snapshot from `provider`.
///
/// The snapshot is taken once, before the first suspension point.
pub async fn evaluate_async<P, S>(provider: &P, spec: &S) -> RuleResult<bool>
where
    P: ContextProvider + ?Sized,
    S: AsyncSpecification<EvaluationContext> + ?Sized,
{
    let context = provider.current_context();
    spec.is_satisfied_by(&context).await
}

/// Resolve `decision` against a fresh snapshot from `provider`.
pub fn decide<P, D, V>(provider: &P, decision: &D) -> Option<V>
where
    P: ContextProvider + ?Sized,
    D: DecisionSpec<EvaluationContext, V> + ?Sized,
{
    let context = provider.current_context();
    decision.decision(&context)
}

/// Resolve `decision` from async code against a fresh snapshot from `provider`.
///
/// The snapshot is taken when the returned future is first polled.
pub async fn decide_async<P, D, V>(provider: &P, decision: &D) -> RuleResult<Option<V>>
where
    P: ContextProvider + ?Sized,
    D: DecisionSpec<EvaluationContext, V> + ?Sized,
{
    let context = provider.current_context();
    Ok(decision.decision(&context))
}

/// A boolean backed by a specification.
#[derive(Clone)]
pub struct Satisfies {
    provider: Arc<dyn ContextProvider>,
    spec: AnySpec<EvaluationContext>,
}

impl Satisfies {
    pub fn new<S>(provider: Arc<dyn ContextProvider>, spec: S) -> Self
    where
        S: Specification<EvaluationContext> + 'static,
    {
        Self {
            provider,
            spec: spec.boxed(),
        }
    }

    /// Start composing the rule from several parts.
    pub fn builder(provider: Arc<dyn ContextProvider>) -> SatisfiesBuilder {
        SatisfiesBuilder {
            provider,
            specs: SpecBuilder::new(),
        }
    }

    pub fn current_value(&self) -> bool {
        evaluate(self.provider.as_ref(), &self.spec)
    }

    pub async fn current_value_async(&self) -> RuleResult<bool> {
        evaluate_async(self.provider.as_ref(), &Immediate(self.spec.clone())).await
    }

    pub fn spec(&self) -> &AnySpec<EvaluationContext> {
        &self.spec
    }
}

impl fmt::Debug for Satisfies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satisfies").finish_non_exhaustive()
    }
}

/// Builder returned by [`Satisfies::builder`].
pub struct SatisfiesBuilder {
    provider: Arc<dyn ContextProvider>,
    specs: SpecBuilder<EvaluationContext>,
}

impl SatisfiesBuilder {
    pub fn with<S>(mut self, spec: S) -> Self
    where
        S: Specification<EvaluationContext> + 'static,
    {
        self.specs = self.specs.with(spec);
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EvaluationContext) -> bool + Send + Sync + 'static,
    {
        self.specs = self.specs.predicate(predicate);
        self
    }

    /// Every collected rule must hold.
    pub fn build_all(self) -> Satisfies {
        Satisfies::new(self.provider, self.specs.build_all())
    }

    /// At least one collected rule must hold.
    pub fn build_any(self) -> Satisfies {
        Satisfies::new(self.provider, self.specs.build_any())
    }
}

/// A boolean backed by an asynchronous specification.
#[derive(Clone)]
pub struct AsyncSatisfies {
    provider: Arc<dyn ContextProvider>,
    spec: AnyAsyncSpec<EvaluationContext>,
}

impl AsyncSatisfies {
    pub fn new<S>(provider: Arc<dyn ContextProvider>, spec: S) -> Self
    where
        S: AsyncSpecification<EvaluationContext> + 'static,
    {
        Self {
            provider,
            spec: Arc::new(spec),
        }
    }

    pub async fn current_value(&self) -> RuleResult<bool> {
        evaluate_async(self.provider.as_ref(), self.spec.as_ref()).await
    }

    /// Like [`AsyncSatisfies::current_value`], abandoned when `token` is cancelled.
    pub async fn current_value_cancellable(&self, token: &CancellationToken) -> RuleResult<bool> {
        let context = self.provider.current_context();
        evaluate_cancellable(self.spec.as_ref(), &context, token).await
    }
}

impl fmt::Debug for AsyncSatisfies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncSatisfies").finish_non_exhaustive()
    }
}

/// A typed value backed by a decision, with a default when no rule applies.
pub struct Decides<V> {
    provider: Arc<dyn ContextProvider>,
    decision: Arc<dyn DecisionSpec<EvaluationContext, V>>,
    default: V,
}

impl<V: Clone> Decides<V> {
    pub fn new<D>(provider: Arc<dyn ContextProvider>, decision: D, default: V) -> Self
    where
        D: DecisionSpec<EvaluationContext, V> + 'static,
    {
        Self {
            provider,
            decision: Arc::new(decision),
            default,
        }
    }

    pub fn current_value(&self) -> V {
        decide(self.provider.as_ref(), self.decision.as_ref()).unwrap_or_else(|| self.default.clone())
    }

    pub async fn current_value_async(&self) -> RuleResult<V> {
        let value = decide_async(self.provider.as_ref(), self.decision.as_ref()).await?;
        Ok(value.unwrap_or_else(|| self.default.clone()))
    }
}

impl<V: fmt::Debug> fmt::Debug for Decides<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decides")
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// An optional typed value backed by a decision.
pub struct Maybe<V> {
    provider: Arc<dyn ContextProvider>,
    decision: Arc<dyn DecisionSpec<EvaluationContext, V>>,
}

impl<V> Maybe<V> {
    pub fn new<D>(provider: Arc<dyn ContextProvider>, decision: D) -> Self
    where
        D: DecisionSpec<EvaluationContext, V> + 'static,
    {
        Self {
            provider,
            decision: Arc::new(decision),
        }
    }

    pub fn current_value(&self) -> Option<V> {
        decide(self.provider.as_ref(), self.decision.as_ref())
    }

    pub async fn current_value_async(&self) -> RuleResult<Option<V>> {
        decide_async(self.provider.as_ref(), self.decision.as_ref()).await
    }
}

impl<V> fmt::Debug for Maybe<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maybe").finish_non_exhaustive()
    }
}
