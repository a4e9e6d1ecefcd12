//! Model-checked harnesses.
//!
//! Each harness applies writes both to a real table and to an in-memory
//! model, asserting after every operation that the two agree on return
//! values, and on demand that a fresh reader sees exactly the model.

use crate::generators::{MapOp, MultimapOp};
use lmdbmap_core::{Environment, Map, Multimap};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Harness comparing a [`Map`] against a `BTreeMap`.
pub struct MapModelHarness<'env> {
    env: &'env Environment,
    map: Map<u16, u32>,
    model: BTreeMap<u16, u32>,
}

impl<'env> MapModelHarness<'env> {
    /// Opens (or creates) the map table `name`.
    pub fn new(env: &'env Environment, name: &str) -> Self {
        Self {
            env,
            map: Map::open(env, name).expect("Failed to open map"),
            model: BTreeMap::new(),
        }
    }

    /// Returns the model contents.
    pub fn model(&self) -> &BTreeMap<u16, u32> {
        &self.model
    }

    /// Applies `ops` in one write transaction and commits.
    pub fn apply(&mut self, ops: &[MapOp]) {
        let mut txn = self.env.begin_write().expect("Failed to begin write");
        for op in ops {
            match *op {
                MapOp::Insert(k, v) => {
                    let inserted = self.map.insert(&mut txn, &k, &v).expect("insert failed");
                    let expected = !self.model.contains_key(&k);
                    if expected {
                        self.model.insert(k, v);
                    }
                    assert_eq!(inserted, expected, "insert({k}) result mismatch");
                }
                MapOp::Put(k, v) => {
                    self.map.put(&mut txn, &k, &v).expect("put failed");
                    self.model.insert(k, v);
                }
                MapOp::Erase(k) => {
                    let erased = self.map.erase(&mut txn, &k).expect("erase failed");
                    assert_eq!(
                        erased,
                        self.model.remove(&k).is_some(),
                        "erase({k}) result mismatch"
                    );
                }
                MapOp::Clear => {
                    self.map.clear(&mut txn).expect("clear failed");
                    self.model.clear();
                }
            }
        }
        txn.commit().expect("Failed to commit");
    }

    /// Applies `ops` in a write transaction that is then aborted. The model
    /// is left untouched.
    pub fn apply_and_abort(&mut self, ops: &[MapOp]) {
        let mut txn = self.env.begin_write().expect("Failed to begin write");
        for op in ops {
            match *op {
                MapOp::Insert(k, v) => {
                    self.map.insert(&mut txn, &k, &v).expect("insert failed");
                }
                MapOp::Put(k, v) => self.map.put(&mut txn, &k, &v).expect("put failed"),
                MapOp::Erase(k) => {
                    self.map.erase(&mut txn, &k).expect("erase failed");
                }
                MapOp::Clear => self.map.clear(&mut txn).expect("clear failed"),
            }
        }
        txn.abort();
    }

    /// Checks contents, size and bound queries at `probes` in a fresh reader.
    pub fn verify(&self, probes: &[u16]) {
        let txn = self.env.begin_read().expect("Failed to begin read");

        let stored: Vec<(u16, u32)> = self
            .map
            .begin(&txn)
            .expect("begin failed")
            .collect::<Result<_, _>>()
            .expect("iteration failed");
        let expected: Vec<(u16, u32)> = self.model.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(stored, expected, "contents mismatch");
        assert_eq!(self.map.len(&txn).expect("len failed"), self.model.len());
        assert_eq!(
            self.map.is_empty(&txn).expect("is_empty failed"),
            self.model.is_empty()
        );

        for &probe in probes {
            let lower = self.map.lower_bound(&txn, &probe).expect("lower_bound failed");
            let expected = self.model.range(probe..).next().map(|(k, _)| *k);
            assert_eq!(lower.key().expect("decode failed"), expected, "lower_bound({probe})");

            let upper = self.map.upper_bound(&txn, &probe).expect("upper_bound failed");
            let expected = self
                .model
                .range((Bound::Excluded(probe), Bound::Unbounded))
                .next()
                .map(|(k, _)| *k);
            assert_eq!(upper.key().expect("decode failed"), expected, "upper_bound({probe})");

            let found = self.map.find(&txn, &probe).expect("find failed");
            assert_eq!(
                found.get().expect("decode failed"),
                self.model.get(&probe).map(|v| (probe, *v)),
                "find({probe})"
            );
            assert_eq!(
                self.map.get(&txn, &probe).expect("get failed"),
                self.model.get(&probe).copied()
            );
        }
    }
}

/// Harness comparing a [`Multimap`] against a `BTreeMap` of `BTreeSet`s.
pub struct MultimapModelHarness<'env> {
    env: &'env Environment,
    multimap: Multimap<u16, u16>,
    model: BTreeMap<u16, BTreeSet<u16>>,
}

impl<'env> MultimapModelHarness<'env> {
    /// Opens (or creates) the multimap table `name`.
    pub fn new(env: &'env Environment, name: &str) -> Self {
        Self {
            env,
            multimap: Multimap::open(env, name).expect("Failed to open multimap"),
            model: BTreeMap::new(),
        }
    }

    /// Returns the number of pairs in the model.
    pub fn pair_count(&self) -> usize {
        self.model.values().map(BTreeSet::len).sum()
    }

    /// Applies `ops` in one write transaction and commits.
    pub fn apply(&mut self, ops: &[MultimapOp]) {
        let mut txn = self.env.begin_write().expect("Failed to begin write");
        for op in ops {
            match *op {
                MultimapOp::Insert(k, v) => {
                    let inserted = self
                        .multimap
                        .insert(&mut txn, &k, &v)
                        .expect("insert failed");
                    assert_eq!(
                        inserted,
                        self.model.entry(k).or_default().insert(v),
                        "insert({k}, {v}) result mismatch"
                    );
                }
                MultimapOp::Erase(k) => {
                    let erased = self.multimap.erase(&mut txn, &k).expect("erase failed");
                    assert_eq!(erased, self.model.remove(&k).is_some());
                }
                MultimapOp::ErasePair(k, v) => {
                    let erased = self
                        .multimap
                        .erase_pair(&mut txn, &k, &v)
                        .expect("erase_pair failed");
                    let expected = match self.model.get_mut(&k) {
                        Some(values) => {
                            let removed = values.remove(&v);
                            if values.is_empty() {
                                self.model.remove(&k);
                            }
                            removed
                        }
                        None => false,
                    };
                    assert_eq!(erased, expected, "erase_pair({k}, {v}) result mismatch");
                }
                MultimapOp::Clear => {
                    self.multimap.clear(&mut txn).expect("clear failed");
                    self.model.clear();
                }
            }
        }
        txn.commit().expect("Failed to commit");
    }

    /// Checks contents, per-key values and bound queries in a fresh reader.
    pub fn verify(&self, probes: &[u16]) {
        let txn = self.env.begin_read().expect("Failed to begin read");

        let stored: Vec<(u16, u16)> = self
            .multimap
            .begin(&txn)
            .expect("begin failed")
            .collect::<Result<_, _>>()
            .expect("iteration failed");
        let expected: Vec<(u16, u16)> = self
            .model
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (*k, *v)))
            .collect();
        assert_eq!(stored, expected, "contents mismatch");
        assert_eq!(
            self.multimap.len(&txn).expect("len failed"),
            self.pair_count()
        );

        for &probe in probes {
            let values = self.multimap.get(&txn, &probe).expect("get failed");
            let expected: Vec<u16> = self
                .model
                .get(&probe)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            assert_eq!(values, expected, "get({probe})");
            assert_eq!(
                self.multimap.count(&txn, &probe).expect("count failed"),
                expected.len()
            );

            let first_pair = |bound: Bound<u16>| {
                self.model
                    .range((bound, Bound::Unbounded))
                    .next()
                    .and_then(|(k, set)| set.iter().next().map(|v| (*k, *v)))
            };

            let lower = self
                .multimap
                .lower_bound(&txn, &probe)
                .expect("lower_bound failed");
            assert_eq!(
                lower.get().expect("decode failed"),
                first_pair(Bound::Included(probe)),
                "lower_bound({probe})"
            );

            let upper = self
                .multimap
                .upper_bound(&txn, &probe)
                .expect("upper_bound failed");
            assert_eq!(
                upper.get().expect("decode failed"),
                first_pair(Bound::Excluded(probe)),
                "upper_bound({probe})"
            );

            let (mut it, end) = self
                .multimap
                .equal_range(&txn, &probe)
                .expect("equal_range failed");
            let mut in_range = Vec::new();
            while it != end {
                in_range.push(it.value().expect("decode failed").expect("not at end"));
                it.advance().expect("advance failed");
            }
            assert_eq!(in_range, expected, "equal_range({probe})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestEnv;
    use crate::generators::{
        map_batches_strategy, map_op_strategy, multimap_batches_strategy, probe_strategy,
    };
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn map_matches_model(
            batches in map_batches_strategy(6, 40),
            probes in probe_strategy(),
        ) {
            let test_env = TestEnv::new();
            let mut harness = MapModelHarness::new(&test_env, "model");
            for batch in &batches {
                harness.apply(batch);
                harness.verify(&probes);
            }
        }

        #[test]
        fn aborted_batches_leave_no_trace(
            committed in prop::collection::vec(map_op_strategy(), 0..30),
            aborted in prop::collection::vec(map_op_strategy(), 1..30),
            probes in probe_strategy(),
        ) {
            let test_env = TestEnv::new();
            let mut harness = MapModelHarness::new(&test_env, "model");
            harness.apply(&committed);
            harness.apply_and_abort(&aborted);
            harness.verify(&probes);
        }

        #[test]
        fn multimap_matches_model(
            batches in multimap_batches_strategy(6, 40),
            probes in probe_strategy(),
        ) {
            let test_env = TestEnv::new();
            let mut harness = MultimapModelHarness::new(&test_env, "model");
            for batch in &batches {
                harness.apply(batch);
                harness.verify(&probes);
            }
        }
    }

    #[test]
    fn fixed_sequence() {
        let test_env = TestEnv::new();
        let mut harness = MapModelHarness::new(&test_env, "fixed");
        harness.apply(&[
            MapOp::Put(10, 1),
            MapOp::Put(20, 2),
            MapOp::Insert(20, 99),
            MapOp::Put(30, 3),
            MapOp::Erase(40),
        ]);
        harness.verify(&[0, 10, 15, 20, 25, 30, 35]);
        assert_eq!(harness.model().get(&20), Some(&2));
    }
}
