#![cfg(test)]

// Property tests for SymTable kept inside the crate so they can call the
// structural consistency check after every operation.

use crate::sym_table::{PutError, SymTable};
use crate::tiers::Tiers;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations: indices shrink toward earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Bump(usize, i32),
    Map,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z\\x00]{0,6}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Replace(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,6}".prop_map(|s| s)].prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => Just(Op::Map),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drive `sut` and a std HashMap model through the same operations.
// Invariants checked after each op:
// - put fails exactly when the key is present, and leaves the value alone.
// - replace/remove return the model's previous value, or None when absent.
// - map visits each live key exactly once with its current value.
// - len parity and structural consistency (buckets, chains, unique keys).
fn run_state_machine(
    mut sut: SymTable<i32>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                let already = model.contains_key(k);
                match sut.put(k, v) {
                    Ok(()) => {
                        prop_assert!(!already, "put must fail on duplicate");
                        model.insert(k.clone(), v);
                    }
                    Err(PutError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(sut.get(k), model.get(k));
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
            Op::Replace(i, v) => {
                let k = &pool[i];
                let expected = model.get_mut(k).map(|mv| std::mem::replace(mv, v));
                prop_assert_eq!(sut.replace(k, v), expected);
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(!sut.contains(k));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            Op::Bump(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence mismatch for {:?}", k),
                }
            }
            Op::Map => {
                let mut visited: BTreeMap<String, i32> = BTreeMap::new();
                let mut repeats = 0usize;
                sut.map(
                    |k, v, repeats: &mut usize| {
                        if visited.insert(k.to_string(), *v).is_some() {
                            *repeats += 1;
                        }
                    },
                    &mut repeats,
                );
                prop_assert_eq!(repeats, 0);
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(visited, expected);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.assert_consistent();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(SymTable::new(), &pool, ops)?;
    }
}

// Same invariants with tiny tiers so random sequences cross several
// growth boundaries and then saturate the top tier.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_small_tiers((pool, ops) in arb_scenario()) {
        let tiers = Tiers::new(vec![1, 2, 3, 5, 7]).unwrap();
        run_state_machine(SymTable::with_tiers(tiers).unwrap(), &pool, ops)?;
    }
}

// Worst-case collisions: a single bucket forces every key into one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_single_bucket((pool, ops) in arb_scenario()) {
        let tiers = Tiers::new(vec![1]).unwrap();
        run_state_machine(SymTable::with_tiers(tiers).unwrap(), &pool, ops)?;
    }
}
