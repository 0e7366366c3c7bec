//! Runtime specification engine for composable business rules.
//!
//! Rules are [`Specification`]s: pure predicates over a subject, composed
//! with AND/OR/NOT. The built-in predicates read an [`EvaluationContext`],
//! an immutable snapshot of counters, flags, events and user data taken from
//! a [`ContextProvider`].
//!
//! # Example
//!
//! ```ignore
//! use themis_rules::prelude::*;
//!
//! let provider = DefaultContextProvider::shared();
//! let can_show_banner = MaxCountSpec::new("banner_shown", 3)
//!     .and(CooldownIntervalSpec::hours("banner_shown", 4));
//!
//! if evaluate(provider.as_ref(), &can_show_banner) {
//!     provider.transaction(|tx| {
//!         tx.increment_counter("banner_shown");
//!         tx.record_event("banner_shown");
//!     });
//! }
//! ```
//!
//! [`Specification`]: specification::Specification
//! [`EvaluationContext`]: context::EvaluationContext
//! [`ContextProvider`]: provider::ContextProvider

pub mod async_spec;
pub mod binding;
pub mod builder;
pub mod composite;
pub mod config;
pub mod context;
pub mod counter;
pub mod decision;
pub mod flag;
pub mod operators;
pub mod provider;
pub mod specification;
pub mod temporal;

/// Prelude module - import everything you need with `use themis_rules::prelude::*`
pub mod prelude {
    pub use crate::async_spec::{
        AnyAsyncSpec, AsyncAnd, AsyncNot, AsyncOr, AsyncPredicateSpec, AsyncSpecification,
        Immediate, evaluate_cancellable, evaluate_with_timeout,
    };
    pub use crate::binding::{
        AsyncSatisfies, Decides, Maybe, Satisfies, SatisfiesBuilder, decide, decide_async, evaluate,
        evaluate_async,
    };
    pub use crate::builder::SpecBuilder;
    pub use crate::config::ProviderConfig;
    pub use crate::context::EvaluationContext;
    pub use crate::counter::{Comparison, CounterRangeSpec, CounterSpec, MaxCountSpec};
    pub use crate::decision::{DecisionSpec, FirstMatchCases, FirstMatchSpec};
    pub use crate::flag::{FlagSpec, UserDataSpec};
    pub use crate::operators::{AsyncSpec, Spec};
    pub use crate::provider::{
        ContextProvider, DefaultContextProvider, ProviderTransaction, StaticContextProvider,
    };
    pub use crate::specification::{
        AllOf, AlwaysFalse, AlwaysTrue, And, AnyOf, AnySpec, Not, Or, PredicateSpec,
        SpecIteratorExt, Specification,
    };
    pub use crate::temporal::{CooldownIntervalSpec, TimeSinceEventSpec, TimeSinceLaunchSpec};
    pub use themis_common::{Clock, ManualClock, RuleError, RuleResult, SystemClock};
}
