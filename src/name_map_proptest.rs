#![cfg(test)]

// Property tests for NameMap kept inside the crate so they can check the
// internal generation (fill, width, slot consistency) after every step.

use crate::error::MapError;
use crate::keys::usable_fraction;
use crate::name::Name;
use crate::name_map::NameMap;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// names, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    // Push the name onto the vector (or re-set its current position).
    Set(usize),
    // Remove the name from the vector and the map together.
    DeleteShift(usize),
    Get(usize),
    Contains(String),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,31}", 1..=48).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => idx.clone().prop_map(OpI::Set),
            3 => idx.clone().prop_map(OpI::DeleteShift),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,40}"].prop_map(OpI::Contains),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drive `sut` and a `Vec<Name>` standing in for the external vector through
// the same operations. Invariants exercised after every step:
// - every name in the vector maps to its current index in the vector;
// - `len` equals the vector length; absent names are not found;
// - structural checks: capacity bounds, power-of-two size, slot reachability;
// - re-setting a present name keeps `len` and the table size unchanged;
// - a new name into a full table grows it; no insert shrinks it.
fn run_scenario<S: BuildHasher>(
    mut sut: NameMap<S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut vector: Vec<Name> = Vec::new();

    for op in ops {
        match op {
            OpI::Set(i) => {
                let name = Name::new(&pool[i]).expect("pool names are valid");
                let size_before = sut.capacity();
                let len_before = sut.len();
                match vector.iter().position(|n| *n == name) {
                    Some(p) => {
                        sut.set(&name, p).expect("overwrite never fails");
                        prop_assert_eq!(sut.len(), len_before);
                        prop_assert_eq!(sut.capacity(), size_before);
                    }
                    None => {
                        let full = len_before == sut.usable();
                        vector.push(name);
                        sut.set(&name, vector.len() - 1).expect("insert ok");
                        prop_assert_eq!(sut.len(), len_before + 1);
                        if full {
                            prop_assert!(sut.capacity() > size_before, "full table must grow");
                        } else {
                            prop_assert!(sut.capacity() >= size_before, "tables never shrink");
                        }
                    }
                }
            }
            OpI::DeleteShift(i) => {
                let name = Name::new(&pool[i]).expect("pool names are valid");
                match vector.iter().position(|n| *n == name) {
                    Some(p) => {
                        vector.remove(p);
                        prop_assert_eq!(sut.delete_shift(&name).ok(), Some(p));
                        prop_assert!(!sut.contains(&name));
                    }
                    None => {
                        prop_assert!(matches!(sut.delete_shift(&name), Err(MapError::NotFound)));
                    }
                }
            }
            OpI::Get(i) => {
                let expected = vector.iter().position(|n| n.as_bytes() == pool[i].as_bytes());
                prop_assert_eq!(sut.get(&pool[i]), expected);
            }
            OpI::Contains(s) => {
                let expected = vector.iter().any(|n| n.as_bytes() == s.as_bytes());
                prop_assert_eq!(sut.contains(&s), expected);
            }
            OpI::Clear => {
                sut.clear().expect("clear ok");
                vector.clear();
                prop_assert_eq!(sut.capacity(), 8);
            }
        }

        // Post-conditions after each op
        prop_assert!(sut.check_invariants().is_ok(), "{:?}", sut.check_invariants());
        prop_assert_eq!(sut.len(), vector.len());
        prop_assert_eq!(sut.is_empty(), vector.is_empty());
        prop_assert_eq!(sut.usable(), usable_fraction(sut.capacity()));
        prop_assert!(sut.len() <= sut.usable() && sut.usable() < sut.capacity());
        for (p, n) in vector.iter().enumerate() {
            prop_assert_eq!(sut.get(n), Some(p));
        }
        let order: Vec<usize> = sut.iter().map(|(_, p)| p).collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..vector.len()).collect::<Vec<_>>());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(NameMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress name comparison,
// tombstone traversal and slot rebinding after compaction.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(NameMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: a map presized for `n` accepts `n` new names without growing,
// and a further name past `usable` grows it while keeping every position.
proptest! {
    #[test]
    fn prop_presized_never_grows(n in 0usize..300) {
        let mut m = NameMap::with_capacity(n).unwrap();
        let size = m.capacity();
        for i in 0..n {
            m.set(&format!("n{}", i), i).unwrap();
        }
        prop_assert_eq!(m.capacity(), size);

        let usable = m.usable();
        for i in n..usable {
            m.set(&format!("n{}", i), i).unwrap();
        }
        prop_assert_eq!(m.capacity(), size);
        m.set(&format!("n{}", usable), usable).unwrap();
        prop_assert!(m.capacity() > size);
        for i in 0..=usable {
            prop_assert_eq!(m.get(&format!("n{}", i)), Some(i));
        }
        prop_assert!(m.check_invariants().is_ok());
    }
}
