use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn check_against_map<K, V>(t: &ZFastTrie<K, V>, m: &BTreeMap<K, V>)
where
    K: Ord + std::fmt::Debug,
    V: PartialEq + std::fmt::Debug,
{
    if let Err(e) = t.verify() {
        panic!("{e}\n{}", t.dump());
    }
    assert_eq!(t.len(), m.len());
    assert!(t.iter().eq(m.iter()), "stored order must match BTreeMap order");
    assert_eq!(t.first_key_or_default(), m.keys().next());
    assert_eq!(t.last_key_or_default(), m.keys().next_back());
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    // A small alphabet, so keys share long prefixes and hit the same exit
    // nodes; 0x00 exercises the terminator escaping.
    prop_oneof![
        4 => prop::collection::vec(0u8..4, 0..=12),
        1 => prop::collection::vec(any::<u8>(), 0..=24),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Add(#[proptest(strategy = "key_strategy()")] Vec<u8>, u64),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 2)]
    Successor(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 2)]
    Predecessor(#[proptest(strategy = "key_strategy()")] Vec<u8>),
}

#[derive(Clone, Debug, Arbitrary)]
enum IntOp {
    Add(#[proptest(strategy = "0u64..512")] u64),
    Bound(#[proptest(strategy = "0u64..520")] u64),
    AddWide(u64),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_bytes(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: ZFastTrie<Vec<u8>, u64> = ZFastTrie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(key, value) => {
                    let fresh = !m.contains_key(&key);
                    prop_assert_eq!(t.add(key.clone(), value), fresh);
                    m.entry(key).or_insert(value);
                    t.verify().map_err(|e| TestCaseError::fail(format!("{e}\n{}", t.dump())))?;
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.contains(&key), m.contains_key(&key));
                    prop_assert_eq!(t.try_get(&key), m.get(&key));
                }
                Op::Successor(key) => {
                    let expected = m.range(key.clone()..).next().map(|(k, _)| k);
                    prop_assert_eq!(t.successor_or_default(&key), expected);
                    let leaf = t.successor_internal(&key);
                    prop_assert_eq!(leaf.is_tail(), expected.is_none());
                }
                Op::Predecessor(key) => {
                    let expected = m.range(..key.clone()).next_back().map(|(k, _)| k);
                    prop_assert_eq!(t.predecessor_or_default(&key), expected);
                    let leaf = t.predecessor_internal(&key);
                    prop_assert_eq!(leaf.is_head(), expected.is_none());
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        check_against_map(&t, &m);
    }

    #[test]
    fn prop_equivalence_integers(ops in prop::collection::vec(any::<IntOp>(), 0..=400)) {
        let mut t: ZFastTrie<u64, ()> = ZFastTrie::new();
        let mut m: BTreeMap<u64, ()> = BTreeMap::new();

        for op in ops {
            match op {
                IntOp::Add(key) | IntOp::AddWide(key) => {
                    prop_assert_eq!(t.add(key, ()), m.insert(key, ()).is_none());
                }
                IntOp::Bound(key) => {
                    prop_assert_eq!(
                        t.successor_or_default(&key),
                        m.range(key..).next().map(|(k, _)| k)
                    );
                    prop_assert_eq!(
                        t.predecessor_or_default(&key),
                        m.range(..key).next_back().map(|(k, _)| k)
                    );
                }
            }
        }

        check_against_map(&t, &m);
    }

    #[test]
    fn prop_strings_sort_bytewise(keys in prop::collection::vec("[a-c]{0,6}", 0..=64)) {
        let t: ZFastTrie<String, usize> = keys.iter().cloned().zip(0..).collect();
        let mut m: BTreeMap<String, usize> = BTreeMap::new();
        for (k, i) in keys.into_iter().zip(0..) {
            m.entry(k).or_insert(i);
        }
        check_against_map(&t, &m);
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
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
        b"".to_vec(),
    ];
    let probes: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"\x00".to_vec(),
        b"a".to_vec(),
        b"a\x00".to_vec(),
        b"aaa".to_vec(),
        b"abz".to_vec(),
        b"bb".to_vec(),
        b"d".to_vec(),
    ];

    for_each_permutation(&keys, |perm| {
        let mut t: ZFastTrie<Vec<u8>, u64> = ZFastTrie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert!(t.add(k.clone(), v));
            m.insert(k, v);
            t.verify().unwrap();
        }

        check_against_map(&t, &m);
        for q in &probes {
            assert_eq!(t.successor_or_default(q), m.range(q.clone()..).next().map(|(k, _)| k));
            assert_eq!(t.predecessor_or_default(q), m.range(..q.clone()).next_back().map(|(k, _)| k));
        }
    });
}

#[test]
fn exhaustive_insert_order_nested_integers() {
    // Keys whose binarizations nest deeply: every split lands on a different
    // jump-pointer level.
    let keys: Vec<u16> = vec![0, 1, 2, 4, 8, 0x100, 0x8000, 0xFFFF];

    for_each_permutation(&keys, |perm| {
        let t: ZFastTrie<u16, ()> = perm.into_iter().map(|k| (k, ())).collect();
        t.verify().unwrap();
        assert!(t.keys().copied().eq(keys.iter().copied()));
    });
}
