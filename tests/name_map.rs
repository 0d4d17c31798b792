// NameMap unit test suite (public API).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Lookup: get after set returns the position just bound.
// - Idempotence: re-setting a bound name never adds an entry.
// - Shift law: delete_shift mirrors Vec::remove on the caller's vector.
// - Capacity: nentries <= usable < capacity; capacity is a power of two;
//   a table grows only when a new name arrives while it is full.
// - Clear: returns to the minimum table and forgets every name.
use name_index_map::{MapError, Name, NameMap, MIN_SIZE, NAME_LEN};

fn zone(i: usize) -> String {
    format!("Zone_{:04}", i)
}

// Test: set/get round trip over many unique names.
// Assumes: names are unique.
// Verifies: get(name) == position for every bound name across growth.
#[test]
fn get_after_set_returns_position() {
    let mut m = NameMap::new();
    for i in 0..1000 {
        m.set(&zone(i), i).expect("set ok");
        assert_eq!(m.get(&zone(i)), Some(i));
    }
    for i in 0..1000 {
        assert_eq!(m.get(&zone(i)), Some(i));
        assert!(m.contains(&zone(i)));
    }
    assert_eq!(m.len(), 1000);
    assert!(m.get("Zone_9999").is_none());
    m.check_invariants().expect("consistent");
}

// Test: idempotent set.
// Assumes: the name is already bound.
// Verifies: len and capacity unchanged; the position stays the same.
#[test]
fn set_twice_is_idempotent() {
    let mut m = NameMap::new();
    m.set("Base", 3).unwrap();
    m.set("Base", 3).unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m.get("Base"), Some(3));
    assert_eq!(m.capacity(), MIN_SIZE);
}

// Test: the shift law on a five-element vector.
// Assumes: positions 0..5 bound in order.
// Verifies: removing position 2 moves 3→2 and 4→3; the removed name is gone.
#[test]
fn delete_shift_moves_later_positions_down() {
    let mut vector: Vec<String> = (0..5).map(zone).collect();
    let mut m = NameMap::from_names(&vector).expect("index built");

    let removed = vector.remove(2);
    assert_eq!(m.delete_shift(&removed).unwrap(), 2);
    assert_eq!(m.get(&removed), None);

    let got: Vec<_> = (0..5).map(|i| m.get(&zone(i))).collect();
    assert_eq!(got, [Some(0), Some(1), None, Some(2), Some(3)]);
    for (p, n) in vector.iter().enumerate() {
        assert_eq!(m.get(n), Some(p));
    }
}

// Test: delete of an absent name.
// Verifies: NotFound and no change to existing bindings.
#[test]
fn delete_absent_is_not_found() {
    let mut m = NameMap::from_names(["a", "b"]).unwrap();
    assert!(matches!(m.delete_shift("c"), Err(MapError::NotFound)));
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("b"), Some(1));
}

// Test: deleting from the front, middle and back while mirroring a Vec.
// Verifies: the map agrees with the vector after every removal.
#[test]
fn repeated_deletes_track_vector() {
    let mut vector: Vec<String> = (0..64).map(zone).collect();
    let mut m = NameMap::from_names(&vector).unwrap();
    let mut pick = 0usize;
    while !vector.is_empty() {
        pick = (pick * 7 + 3) % vector.len();
        let name = vector.remove(pick);
        assert_eq!(m.delete_shift(&name).unwrap(), pick);
        for (p, n) in vector.iter().enumerate() {
            assert_eq!(m.get(n), Some(p));
        }
        m.check_invariants().unwrap();
    }
    assert!(m.is_empty());
}

// Test: presized maps.
// Assumes: with_capacity(n) picks a table whose usable count is >= n.
// Verifies: n inserts do not grow; the insert past usable does, and all
// positions survive the rehash.
#[test]
fn presized_map_grows_only_past_usable() {
    for n in [5usize, 10, 21, 42, 100] {
        let mut m = NameMap::with_capacity(n).unwrap();
        let size = m.capacity();
        for i in 0..n {
            m.set(&zone(i), i).unwrap();
        }
        assert_eq!(m.capacity(), size, "n={}", n);
        if m.usable() == n {
            m.set(&zone(n), n).unwrap();
            assert!(m.capacity() > size, "n={}", n);
            for i in 0..=n {
                assert_eq!(m.get(&zone(i)), Some(i));
            }
        }
        m.check_invariants().unwrap();
    }
}

// Test: boundary at exactly usable entries.
// Verifies: the next new name grows the table before it is inserted.
#[test]
fn full_table_grows_before_insert() {
    let mut m = NameMap::new();
    let usable = m.usable();
    for i in 0..usable {
        m.set(&zone(i), i).unwrap();
    }
    assert_eq!(m.len(), usable);
    assert_eq!(m.capacity(), MIN_SIZE);
    m.set("one_more", usable).unwrap();
    assert!(m.capacity() > MIN_SIZE);
    assert!(m.capacity().is_power_of_two());
    assert!(m.len() <= m.usable() && m.usable() < m.capacity());
}

// Test: clear.
// Verifies: previously present names are gone and capacity is minimal.
#[test]
fn clear_forgets_everything() {
    let mut m = NameMap::new();
    for i in 0..100 {
        m.set(&zone(i), i).unwrap();
    }
    m.clear().unwrap();
    assert_eq!(m.capacity(), MIN_SIZE);
    assert!(m.is_empty());
    for i in 0..100 {
        assert!(!m.contains(&zone(i)));
    }
    // Still usable after clearing.
    m.set("again", 0).unwrap();
    assert_eq!(m.get("again"), Some(0));
}

// Test: name validation at the boundary.
// Verifies: 32-byte names are accepted, 33-byte names are InvalidKey.
#[test]
fn name_length_boundary() {
    let mut m = NameMap::new();
    let max = "n".repeat(NAME_LEN);
    let over = "n".repeat(NAME_LEN + 1);
    m.set(&max, 0).unwrap();
    assert_eq!(m.get(&max), Some(0));
    match m.set(&over, 1) {
        Err(MapError::InvalidKey { len, .. }) => assert_eq!(len, NAME_LEN + 1),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(m.len(), 1);
    assert!(!m.contains(&over));
}

// Test: slot width follows table size.
// Verifies: one-byte slots for small tables, wider ones once usable
// entries no longer fit in a byte.
#[test]
fn index_width_widens_with_growth() {
    let mut m = NameMap::new();
    assert_eq!(m.index_width(), 1);
    for i in 0..300 {
        m.set(&zone(i), i).unwrap();
    }
    assert!(m.usable() > 254);
    assert_eq!(m.index_width(), 2);
}

// Test: lookups accept str, String, bytes and Name interchangeably.
#[test]
fn borrowed_lookup_forms() {
    let mut m = NameMap::new();
    m.set("FlowSolution", 4).unwrap();
    let as_name = Name::new("FlowSolution").unwrap();
    assert_eq!(m.get("FlowSolution"), Some(4));
    assert_eq!(m.get(&"FlowSolution".to_string()), Some(4));
    assert_eq!(m.get(&b"FlowSolution"[..]), Some(4));
    assert_eq!(m.get(&as_name), Some(4));
}

// Test: iteration order.
// Verifies: iteration yields entries in insertion order, compacted after
// deletes, with current positions.
#[test]
fn iteration_is_insertion_ordered() {
    let mut m = NameMap::new();
    for (p, n) in ["c", "a", "d", "b"].iter().enumerate() {
        m.set(n, p).unwrap();
    }
    m.delete_shift("a").unwrap();
    let got: Vec<(String, usize)> = m.iter().map(|(n, p)| (n.to_string(), p)).collect();
    assert_eq!(
        got,
        [("c".to_string(), 0), ("d".to_string(), 1), ("b".to_string(), 2)]
    );
    assert_eq!((&m).into_iter().len(), 3);
}
