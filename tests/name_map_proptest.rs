// NameMap property tests over the public API.
//
// Property 1: shift law under arbitrary removal orders.
//  - Model: the external vector itself (Vec<String> of unique names).
//  - Operations: remove the element at a random index from the vector and
//    delete_shift the same name from the map.
//  - Invariant: after every step, get(vector[i]) == Some(i) for all i, the
//    removed name is absent, and len() == vector.len().
//
// Property 2: interleaved appends and removals.
//  - Appends push a fresh name and set it to the new last index.
//  - Removals behave as in Property 1.
//  - Invariant: same as Property 1, plus capacity is a power of two and
//    len() <= usable() < capacity().
use name_index_map::NameMap;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn unique_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[A-Za-z][A-Za-z0-9_]{0,31}", 1..120)
        .prop_map(|s: BTreeSet<String>| s.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_shift_law(names in unique_names(), picks in proptest::collection::vec(any::<usize>(), 1..120)) {
        let mut vector = names.clone();
        let mut m = NameMap::from_names(&vector).unwrap();
        for pick in picks {
            if vector.is_empty() {
                break;
            }
            let p = pick % vector.len();
            let name = vector.remove(p);
            prop_assert_eq!(m.delete_shift(&name).ok(), Some(p));
            prop_assert!(!m.contains(&name));
            prop_assert_eq!(m.len(), vector.len());
            for (i, n) in vector.iter().enumerate() {
                prop_assert_eq!(m.get(n), Some(i));
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_interleaved_append_remove(ops in proptest::collection::vec((any::<bool>(), any::<usize>()), 1..300)) {
        let mut m = NameMap::new();
        let mut vector: Vec<String> = Vec::new();
        let mut next = 0usize;
        for (append, pick) in ops {
            if append || vector.is_empty() {
                let name = format!("node{}", next);
                next += 1;
                vector.push(name.clone());
                m.set(&name, vector.len() - 1).unwrap();
            } else {
                let p = pick % vector.len();
                let name = vector.remove(p);
                prop_assert_eq!(m.delete_shift(&name).ok(), Some(p));
            }
            prop_assert!(m.capacity().is_power_of_two());
            prop_assert!(m.len() <= m.usable() && m.usable() < m.capacity());
            prop_assert_eq!(m.len(), vector.len());
            for (i, n) in vector.iter().enumerate() {
                prop_assert_eq!(m.get(n), Some(i));
            }
        }
        prop_assert!(m.check_invariants().is_ok());
    }
}
