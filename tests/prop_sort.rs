use consolecache::{Node, build_orderer, calc_lower_upper};
use proptest::prelude::*;
use std::cmp::Ordering;

fn row(a: i64, b: i64, seq: usize) -> Node {
    Node::record().plain("a", a).plain("b", b).plain("seq", seq as u64).build()
}

fn int(n: &Node, name: &str) -> i64 {
    match n.member(name) {
        Some(Node::Int(i)) => *i,
        Some(Node::UInt(u)) => *u as i64,
        other => panic!("unexpected {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_multi_key_sort_non_decreasing(v in proptest::collection::vec((-5i64..5, -5i64..5), 0..60)) {
        let mut rows: Vec<Node> = v.iter().enumerate().map(|(i, (a, b))| row(*a, *b, i)).collect();
        build_orderer(Some("`$.a`, `$.b` DESC")).unwrap().sort(&mut rows);
        for w in rows.windows(2) {
            let (a0, b0, a1, b1) = (int(&w[0], "a"), int(&w[0], "b"), int(&w[1], "a"), int(&w[1], "b"));
            prop_assert!(a0 < a1 || (a0 == a1 && b0 >= b1));
        }
    }

    #[test]
    fn prop_sort_is_stable(v in proptest::collection::vec(0i64..4, 0..60)) {
        let mut rows: Vec<Node> = v.iter().enumerate().map(|(i, a)| row(*a, 0, i)).collect();
        build_orderer(Some("`$.a` DESC")).unwrap().sort(&mut rows);
        for w in rows.windows(2) {
            if int(&w[0], "a") == int(&w[1], "a") {
                prop_assert!(int(&w[0], "seq") < int(&w[1], "seq"));
            }
        }
    }

    #[test]
    fn prop_compare_matches_sort(a in any::<i64>(), b in any::<i64>()) {
        let o = build_orderer(Some("`$.a`")).unwrap();
        prop_assert_eq!(o.compare(&row(a, 0, 0), &row(b, 0, 1)), a.cmp(&b));
        prop_assert_eq!(o.compare(&row(a, 0, 0), &row(a, 1, 1)), Ordering::Equal);
    }

    #[test]
    fn prop_window_within_bounds(offset in proptest::option::of(any::<i64>()), limit in proptest::option::of(any::<i64>()), total in 0usize..1000) {
        let (lower, upper) = calc_lower_upper(offset, limit, total);
        prop_assert!(lower <= upper && upper <= total);
        if limit.is_none() {
            prop_assert_eq!(upper, total);
        }
    }
}
