use std::collections::BTreeSet;

use proptest::prelude::*;
use whaisdb_core::core::range::{Boundable, Interval, Range};

fn range_of<T: Boundable>(bounds: &[(T, T)]) -> Range<T> {
    Range::from_intervals(bounds.iter().map(|(a, b)| Interval::new(*a, *b)))
}

fn joined<T: Boundable>(a: &Range<T>, b: &Range<T>) -> Range<T> {
    let mut out = a.clone();
    out.join_range(b);
    out
}

fn matched<T: Boundable>(a: &Range<T>, b: &Range<T>) -> Range<T> {
    let mut out = a.clone();
    out.intersect(b);
    out
}

fn complemented<T: Boundable>(a: &Range<T>) -> Range<T> {
    let mut out = a.clone();
    out.complement();
    out
}

fn is_canonical<T: Boundable>(range: &Range<T>) -> bool {
    range.iter().all(|iv| iv.from() <= iv.to())
        && range
            .intervals()
            .windows(2)
            .all(|w| w[0].to() < w[1].from() && w[0].to().next() < w[1].from())
}

fn members_u8(range: &Range<u8>) -> BTreeSet<u8> {
    (0..=u8::MAX).filter(|v| range.contains(v)).collect()
}

fn bounds_u8() -> impl Strategy<Value = Vec<(u8, u8)>> {
    proptest::collection::vec((any::<u8>(), any::<u8>()), 0..8)
}

fn bounds_i8() -> impl Strategy<Value = Vec<(i8, i8)>> {
    proptest::collection::vec((any::<i8>(), any::<i8>()), 0..8)
}

fn bounds_u32() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop_oneof![
        proptest::collection::vec((any::<u32>(), any::<u32>()), 0..8),
        proptest::collection::vec((0u32..64, 0u32..64), 0..8),
        proptest::collection::vec((u32::MAX - 64..=u32::MAX, u32::MAX - 64..=u32::MAX), 0..8),
    ]
}

macro_rules! algebra_laws {
    ($module:ident, $strategy:ident) => {
        mod $module {
            use super::*;

            proptest! {
                #![proptest_config(ProptestConfig::with_cases(200))]

                #[test]
                fn join_is_idempotent(a in $strategy()) {
                    let a = range_of(&a);
                    prop_assert_eq!(joined(&a, &a), a);
                }

                #[test]
                fn join_and_match_commute(a in $strategy(), b in $strategy()) {
                    let (a, b) = (range_of(&a), range_of(&b));
                    prop_assert_eq!(joined(&a, &b), joined(&b, &a));
                    prop_assert_eq!(matched(&a, &b), matched(&b, &a));
                }

                #[test]
                fn join_is_associative(a in $strategy(), b in $strategy(), c in $strategy()) {
                    let (a, b, c) = (range_of(&a), range_of(&b), range_of(&c));
                    prop_assert_eq!(joined(&joined(&a, &b), &c), joined(&a, &joined(&b, &c)));
                }

                #[test]
                fn match_absorbs_universal_and_empty(a in $strategy()) {
                    let a = range_of(&a);
                    prop_assert_eq!(matched(&a, &Range::universal()), a.clone());
                    prop_assert!(matched(&a, &Range::new()).is_empty());
                    prop_assert!(joined(&a, &Range::universal()).is_universal());
                    prop_assert_eq!(joined(&a, &Range::new()), a);
                }

                #[test]
                fn complement_is_an_involution(a in $strategy()) {
                    let a = range_of(&a);
                    prop_assert_eq!(complemented(&complemented(&a)), a);
                }

                #[test]
                fn complement_partitions_the_domain(a in $strategy()) {
                    let a = range_of(&a);
                    let c = complemented(&a);
                    prop_assert!(joined(&a, &c).is_universal());
                    prop_assert!(matched(&a, &c).is_empty());
                }

                #[test]
                fn join_is_absorbed_by_match(a in $strategy(), b in $strategy()) {
                    let (a, b) = (range_of(&a), range_of(&b));
                    prop_assert_eq!(matched(&joined(&a, &b), &a), a);
                }

                #[test]
                fn results_stay_canonical(a in $strategy(), b in $strategy()) {
                    let (a, b) = (range_of(&a), range_of(&b));
                    prop_assert!(is_canonical(&a));
                    prop_assert!(is_canonical(&joined(&a, &b)));
                    prop_assert!(is_canonical(&matched(&a, &b)));
                    prop_assert!(is_canonical(&complemented(&a)));
                }
            }
        }
    };
}

algebra_laws!(uint8_laws, bounds_u8);
algebra_laws!(int8_laws, bounds_i8);
algebra_laws!(row_index_laws, bounds_u32);

proptest! {
    #[test]
    fn operations_agree_with_value_sets(a in bounds_u8(), b in bounds_u8()) {
        let (a, b) = (range_of(&a), range_of(&b));
        let (sa, sb) = (members_u8(&a), members_u8(&b));

        prop_assert_eq!(members_u8(&joined(&a, &b)), sa.union(&sb).copied().collect::<BTreeSet<_>>());
        prop_assert_eq!(members_u8(&matched(&a, &b)), sa.intersection(&sb).copied().collect::<BTreeSet<_>>());

        let mut rest = a.clone();
        rest.exclude(&b);
        prop_assert_eq!(members_u8(&rest), sa.difference(&sb).copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn from_values_matches_joined_singles(values in proptest::collection::vec(any::<u8>(), 0..64)) {
        let direct = Range::from_values(values.iter().copied());
        let joined = Range::from_intervals(values.iter().map(|v| Interval::single(*v)));
        prop_assert_eq!(direct, joined);
    }
}
