use super::*;

use crate::node::Color;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Re-derives every structural property from the links. Panics on the first
/// violation.
fn validate_tree<K: Ord + fmt::Debug, V>(t: &RbTree<K, V>) {
    let sentinel = &t.nodes[NodeId::SENTINEL];
    assert_eq!(sentinel.color, Color::Black, "sentinel must be BLACK");
    assert!(sentinel.entry.is_none(), "sentinel must not hold an entry");
    assert_eq!(sentinel.left, NodeId::SENTINEL, "sentinel left link dirty");
    assert_eq!(sentinel.right, NodeId::SENTINEL, "sentinel right link dirty");
    assert_eq!(sentinel.parent, NodeId::SENTINEL, "sentinel parent link dirty");

    assert_eq!(t.nodes.color(t.root), Color::Black, "root must be BLACK");
    if !t.root.is_sentinel() {
        assert_eq!(
            t.nodes[t.root].parent,
            NodeId::SENTINEL,
            "root parent must be the sentinel"
        );
    }

    let mut reachable = 0usize;
    black_height(t, t.root, None, None, &mut reachable);
    assert_eq!(reachable, t.count, "reachable node count must match RbTree::len");
    assert_eq!(
        t.nodes.slot_count() - 1 - t.nodes.vacant_count(),
        t.count,
        "live arena slots must match RbTree::len"
    );

    let keys: Vec<&K> = t.iter().map(|(k, _)| k).collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "in-order keys must be strictly ascending"
    );
}

/// Black-height of the subtree at `id`, checking ordering bounds, parent
/// links and the RED-RED rule on the way down.
fn black_height<'a, K: Ord + fmt::Debug, V>(
    t: &'a RbTree<K, V>,
    id: NodeId,
    lo: Option<&'a K>,
    hi: Option<&'a K>,
    reachable: &mut usize,
) -> usize {
    if id.is_sentinel() {
        return 1;
    }
    *reachable += 1;

    let node = &t.nodes[id];
    let key = t.nodes.key(id);
    if let Some(lo) = lo {
        assert!(lo < key, "{key:?} must sort after {lo:?}");
    }
    if let Some(hi) = hi {
        assert!(key < hi, "{key:?} must sort before {hi:?}");
    }

    for child in [node.left, node.right] {
        if child.is_sentinel() {
            continue;
        }
        assert_eq!(t.nodes[child].parent, id, "child {child:?} has a stale parent link");
        if node.color == Color::Red {
            assert_eq!(
                t.nodes.color(child),
                Color::Black,
                "RED node {key:?} has a RED child"
            );
        }
    }

    let left = black_height(t, node.left, lo, Some(key), reachable);
    let right = black_height(t, node.right, Some(key), hi, reachable);
    assert_eq!(left, right, "black-height differs below {key:?}");
    left + usize::from(node.color == Color::Black)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "-256i32..256")] i32, u64),
    #[proptest(weight = 1)]
    Update(#[proptest(strategy = "-256i32..256")] i32, u64),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "-256i32..256")] i32),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "-256i32..256")] i32),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: RbTree<i32, u64> = RbTree::new();
        let mut m: BTreeMap<i32, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let expected = if m.contains_key(&key) {
                        Err(Error::DuplicateKey)
                    } else {
                        m.insert(key, value);
                        Ok(())
                    };
                    prop_assert_eq!(t.insert(key, value), expected);
                }
                Op::Update(key, value) => {
                    let expected = m
                        .get_mut(&key)
                        .map(|old| std::mem::replace(old, value))
                        .ok_or(Error::KeyNotFound);
                    prop_assert_eq!(t.update(&key, value), expected);
                }
                Op::Remove(key) => {
                    let got = t.remove(&key).map(Entry::into_parts);
                    prop_assert_eq!(got, m.remove_entry(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let got: Vec<(i32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(t.min().map(|(k, _)| *k), m.keys().next().copied());
        prop_assert_eq!(t.max().map(|(k, _)| *k), m.keys().next_back().copied());
    }

    #[test]
    fn prop_remove_all_in_any_order(
        keys in prop::collection::btree_set(any::<i16>(), 0..=300)
            .prop_map(|s| s.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    ) {
        let mut t: RbTree<i16, ()> = keys.iter().map(|k| (*k, ())).collect();
        prop_assert_eq!(t.len(), keys.len());
        validate_tree(&t);

        let mut removal = keys.clone();
        removal.reverse();
        for (i, k) in removal.iter().enumerate() {
            let e = t.remove(k);
            prop_assert_eq!(e.map(|e| *e.key()), Some(*k));
            prop_assert_eq!(t.len(), keys.len() - i - 1);
            validate_tree(&t);
        }

        prop_assert!(t.is_empty());
        prop_assert_eq!(t.min(), None);
        prop_assert_eq!(t.max(), None);
        prop_assert_eq!(t.root, NodeId::SENTINEL);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<i32> = vec![-1, 1, 10, 11, 17, 4, 8];

    for_each_permutation(&keys, |perm| {
        let mut t: RbTree<i32, u64> = RbTree::new();
        let mut m: BTreeMap<i32, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k, v), Ok(()));
            m.insert(k, v);
            validate_tree(&t);
        }

        let got: Vec<(i32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<i32> = vec![-1, 1, 10, 11, 17, 4, 8];

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: RbTree<i32, u64> = RbTree::new();
    let mut base_map: BTreeMap<i32, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        base_tree.insert(*k, v).unwrap();
        base_map.insert(*k, v);
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k).map(Entry::into_parts), m.remove_entry(&k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_sentinel());
    });
}

#[test]
fn scenario_insert_get_remove() {
    crate::init_test_logging();
    let mut t: RbTree<i32, &str> = RbTree::new();
    for (k, v) in [(1, "a"), (10, "b"), (11, "c"), (17, "d"), (-1, "e")] {
        assert!(t.insert(k, v).is_ok());
        validate_tree(&t);
    }

    let mut seen = Vec::new();
    t.range(|k, _| seen.push(*k));
    assert_eq!(seen, vec![-1, 1, 10, 11, 17]);
    assert_eq!(t.get(&10), Some(&"b"));

    let removed = t.remove(&1).expect("1 is present");
    assert_eq!(removed.key(), &1);
    validate_tree(&t);

    seen.clear();
    t.range(|k, _| seen.push(*k));
    assert_eq!(seen, vec![-1, 10, 11, 17]);
}

#[test]
fn random_insert_remove_keeps_invariants() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    crate::init_test_logging();
    let mut rng = StdRng::seed_from_u64(97);
    let mut t: RbTree<u16, u32> = RbTree::new();
    let mut m: BTreeMap<u16, u32> = BTreeMap::new();

    for i in 0..200_000u32 {
        let key: u16 = rng.gen_range(0..512);
        if rng.gen_bool(0.5) {
            let expected = if m.contains_key(&key) {
                Err(Error::DuplicateKey)
            } else {
                m.insert(key, i);
                Ok(())
            };
            assert_eq!(t.insert(key, i), expected);
        } else {
            assert_eq!(t.remove(&key).map(Entry::into_parts), m.remove_entry(&key));
        }
        assert_eq!(t.len(), m.len());
        if i % 97 == 0 {
            validate_tree(&t);
        }
    }

    validate_tree(&t);
    let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(u16, u32)> = m.into_iter().collect();
    assert_eq!(got, expected);
}

#[test]
fn slots_are_recycled() {
    let mut t: RbTree<u32, u32> = (0..100).map(|k| (k, k)).collect();
    let slots = t.nodes.slot_count();
    for k in 0..50 {
        t.remove(&k).unwrap();
    }
    for k in 100..150 {
        t.insert(k, k).unwrap();
    }
    assert_eq!(t.nodes.slot_count(), slots);
    assert_eq!(t.nodes.vacant_count(), 0);
    validate_tree(&t);
}

#[test]
fn height_is_logarithmic() {
    fn height<K, V>(t: &RbTree<K, V>, id: NodeId) -> usize {
        if id.is_sentinel() {
            return 0;
        }
        1 + height(t, t.nodes[id].left).max(height(t, t.nodes[id].right))
    }

    let n = 1 << 14;
    let t: RbTree<u32, ()> = (0..n).map(|k| (k, ())).collect();
    validate_tree(&t);
    // A red-black tree with n nodes has height at most 2 * log2(n + 1).
    assert!(height(&t, t.root) <= 2 * 15);
}
