//! Algebraic laws of the specification combinators.

use chrono::Duration;
use proptest::prelude::*;
use themis_common::time::parse_datetime;
use themis_rules::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A handful of specifications over integers, chosen by index.
fn int_spec(choice: u8, pivot: i64) -> AnySpec<i64> {
    match choice % 5 {
        0 => AnySpec::from_fn(move |n: &i64| *n < pivot),
        1 => AnySpec::from_fn(move |n: &i64| *n % 2 == 0),
        2 => AnySpec::from_fn(move |n: &i64| *n >= pivot),
        3 => AnySpec::always(),
        _ => AnySpec::never(),
    }
}

fn arb_spec() -> impl Strategy<Value = AnySpec<i64>> {
    (any::<u8>(), -100i64..100).prop_map(|(choice, pivot)| int_spec(choice, pivot))
}

fn arb_flags() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn double_negation_is_identity(spec in arb_spec(), x in -1000i64..1000) {
        let twice = spec.clone().not().not();
        prop_assert_eq!(twice.is_satisfied_by(&x), spec.is_satisfied_by(&x));
    }

    #[test]
    fn and_or_match_boolean_logic(a in arb_spec(), b in arb_spec(), x in -1000i64..1000) {
        let (ra, rb) = (a.is_satisfied_by(&x), b.is_satisfied_by(&x));

        prop_assert_eq!(a.clone().and(b.clone()).is_satisfied_by(&x), ra && rb);
        prop_assert_eq!(b.clone().and(a.clone()).is_satisfied_by(&x), ra && rb);
        prop_assert_eq!(a.clone().or(b.clone()).is_satisfied_by(&x), ra || rb);
        prop_assert_eq!(b.or(a).is_satisfied_by(&x), ra || rb);
    }

    #[test]
    fn de_morgan(a in arb_spec(), b in arb_spec(), x in -1000i64..1000) {
        let lhs = a.clone().and(b.clone()).not();
        let rhs = a.not().or(b.not());
        prop_assert_eq!(lhs.is_satisfied_by(&x), rhs.is_satisfied_by(&x));
    }

    #[test]
    fn operators_agree_with_methods(a in arb_spec(), b in arb_spec(), x in -1000i64..1000) {
        let by_operator = (Spec(a.clone()) & !Spec(b.clone())) | Spec(b.clone());
        let by_method = a.and(b.clone().not()).or(b);
        prop_assert_eq!(by_operator.is_satisfied_by(&x), by_method.is_satisfied_by(&x));
    }

    #[test]
    fn max_count_is_strictly_below_limit(count in 0u64..200, limit in 0u64..200) {
        let ctx = EvaluationContext::new().with_counter("k", count);
        prop_assert_eq!(MaxCountSpec::new("k", limit).is_satisfied_by(&ctx), count < limit);
        prop_assert_eq!(MaxCountSpec::inclusive("k", limit).is_satisfied_by(&ctx), count <= limit);
        prop_assert_eq!(MaxCountSpec::exactly("k", limit).is_satisfied_by(&ctx), count == limit);
    }

    #[test]
    fn time_since_event_is_monotonic(interval in 1i64..100_000, elapsed in 0i64..200_000, extra in 0i64..200_000) {
        let now = parse_datetime("2025-01-01T00:00:00Z").unwrap();
        let spec = TimeSinceEventSpec::seconds("e", interval);
        let at = |secs: i64| {
            EvaluationContext::at(now + Duration::seconds(secs)).with_event("e", now)
        };

        prop_assert_eq!(spec.is_satisfied_by(&at(elapsed)), elapsed >= interval);
        if spec.is_satisfied_by(&at(elapsed)) {
            prop_assert!(spec.is_satisfied_by(&at(elapsed + extra)));
        }
    }

    #[test]
    fn first_match_picks_earliest_satisfied((premium, basic, trial) in arb_flags()) {
        let ctx = EvaluationContext::new()
            .with_flag("premium", premium)
            .with_flag("basic", basic)
            .with_flag("trial", trial);
        let spec = FirstMatchCases::new()
            .when(FlagSpec::new("premium"), 3)
            .when(FlagSpec::new("basic"), 2)
            .when(FlagSpec::new("trial"), 1)
            .with_fallback(0);

        let expected = if premium { 3 } else if basic { 2 } else if trial { 1 } else { 0 };
        prop_assert_eq!(spec.decide(&ctx), expected);
    }
}
