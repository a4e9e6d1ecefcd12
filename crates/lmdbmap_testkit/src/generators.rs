//! Property-based test generators using proptest.
//!
//! Keys are drawn from a small domain so that generated operation sequences
//! hit existing entries often.

use proptest::prelude::*;

/// Upper bound (exclusive) of generated keys.
pub const KEY_DOMAIN: u16 = 64;

/// One write against a [`Map`](lmdbmap_core::Map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOp {
    /// `insert(key, value)`.
    Insert(u16, u32),
    /// `put(key, value)`.
    Put(u16, u32),
    /// `erase(key)`.
    Erase(u16),
    /// `clear()`.
    Clear,
}

/// One write against a [`Multimap`](lmdbmap_core::Multimap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultimapOp {
    /// `insert(key, value)`.
    Insert(u16, u16),
    /// `erase(key)`.
    Erase(u16),
    /// `erase_pair(key, value)`.
    ErasePair(u16, u16),
    /// `clear()`.
    Clear,
}

/// Strategy for generating keys within [`KEY_DOMAIN`].
pub fn key_strategy() -> impl Strategy<Value = u16> {
    0..KEY_DOMAIN
}

/// Strategy for generating valid table names.
pub fn table_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating a single map write. Clears are rare.
pub fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        4 => (key_strategy(), any::<u32>()).prop_map(|(k, v)| MapOp::Put(k, v)),
        3 => key_strategy().prop_map(MapOp::Erase),
        1 => Just(MapOp::Clear),
    ]
}

/// Strategy for generating a single multimap write. Values come from a small
/// domain so duplicate pairs occur.
pub fn multimap_op_strategy() -> impl Strategy<Value = MultimapOp> {
    prop_oneof![
        6 => (key_strategy(), 0..16u16).prop_map(|(k, v)| MultimapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MultimapOp::Erase),
        3 => (key_strategy(), 0..16u16).prop_map(|(k, v)| MultimapOp::ErasePair(k, v)),
        1 => Just(MultimapOp::Clear),
    ]
}

/// Strategy for batches of map writes, each batch one transaction.
pub fn map_batches_strategy(
    max_batches: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Vec<MapOp>>> {
    prop::collection::vec(
        prop::collection::vec(map_op_strategy(), 0..max_ops),
        1..max_batches,
    )
}

/// Strategy for batches of multimap writes, each batch one transaction.
pub fn multimap_batches_strategy(
    max_batches: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Vec<MultimapOp>>> {
    prop::collection::vec(
        prop::collection::vec(multimap_op_strategy(), 0..max_ops),
        1..max_batches,
    )
}

/// Strategy for probe keys used in bound queries. Reaches one past the key
/// domain so probes above every stored key are covered.
pub fn probe_strategy() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0..=KEY_DOMAIN, 1..16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    proptest! {
        #[test]
        fn table_names_are_valid(name in table_name_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.len() <= 32);
            prop_assert!(name.chars().next().unwrap().is_ascii_alphabetic());
        }

        #[test]
        fn map_ops_stay_in_domain(op in map_op_strategy()) {
            match op {
                MapOp::Insert(k, _) | MapOp::Put(k, _) | MapOp::Erase(k) => {
                    prop_assert!(k < KEY_DOMAIN);
                }
                MapOp::Clear => {}
            }
        }
    }

    #[test]
    fn batches_are_non_empty() {
        let mut runner = TestRunner::default();
        let batches = multimap_batches_strategy(4, 8)
            .new_tree(&mut runner)
            .unwrap()
            .current();
        assert!(!batches.is_empty());
        assert!(batches.len() < 4);
    }
}
