#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use verkle::{Key, Stem, VerkleTree};

/// A write applied to the tree.
///
/// Operations reference stems via indices into a pre-generated stem pool, so the
/// fuzzer can focus on operation sequences instead of key generation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Inserts or updates slot `index` of the pool stem with a value of the given length.
    Insert { stem: u16, index: u8, len: u8 },

    /// Writes several slots of one pool stem with a single traversal.
    Batch { stem: u16, slots: Vec<(u8, u8)> },
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 64 {
        return;
    }

    let seed: u64 = u64::from_le_bytes(data[0..8].try_into().unwrap());
    let ops = generate_operations(seed, &data[8..]);
    e2e_test(seed, &ops);
});

/// Reads an environment variable and parses it, falling back to default if missing or invalid.
fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Converts raw fuzzer bytes into operations: bytes below 200 become single
/// inserts, the rest become stem batches.
fn generate_operations(seed: u64, data: &[u8]) -> Vec<Operation> {
    let mut rng = StdRng::seed_from_u64(seed);
    data.iter()
        .map(|op| {
            if *op < 200 {
                Operation::Insert {
                    stem: rng.gen(),
                    index: rng.gen(),
                    len: *op % 48,
                }
            } else {
                let slots = (0..rng.gen_range(1..8))
                    .map(|_| (rng.gen(), rng.gen_range(0..48)))
                    .collect();
                Operation::Batch {
                    stem: rng.gen(),
                    slots,
                }
            }
        })
        .collect()
}

/// Builds a pool of stems that share long prefixes with each other, so that stem
/// promotions happen at many depths.
fn stem_pool(seed: u64) -> Vec<Stem> {
    let size = env("RANDOM_STEM_POOL_SIZE", 256);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    (0..size)
        .map(|_| {
            let mut stem = [0u8; 31];
            let depth: usize = rng.gen_range(0..31);
            stem[depth] = rng.gen_range(0..4);
            let other: usize = rng.gen_range(0..31);
            stem[other] = rng.gen_range(0..4);
            Stem(stem)
        })
        .collect()
}

fn value(len: u8, seed: u64) -> Vec<u8> {
    (0..len).map(|i| (seed as u8).wrapping_add(i)).collect()
}

/// Applies every operation and checks that reads match a `BTreeMap` reference and
/// that the incremental root matches the root rebuilt from scratch.
///
/// # Panics
/// Panics if any consistency check fails.
fn e2e_test(seed: u64, ops: &[Operation]) {
    let pool = stem_pool(seed);
    let check_every = env("RANDOM_CHECK_EVERY", 16usize).max(1);

    let mut tree = VerkleTree::new();
    let mut reference: BTreeMap<Key, Vec<u8>> = BTreeMap::new();

    for (step, op) in ops.iter().enumerate() {
        match op {
            Operation::Insert { stem, index, len } => {
                let key = pool[*stem as usize % pool.len()].key(*index);
                let value = value(*len, step as u64);
                tree.insert(key, &value).unwrap();
                reference.insert(key, value);
            }
            Operation::Batch { stem, slots } => {
                let stem = pool[*stem as usize % pool.len()];
                let slots: Vec<_> = slots
                    .iter()
                    .map(|(index, len)| (*index, value(*len, step as u64 ^ *index as u64)))
                    .collect();
                for (index, value) in &slots {
                    reference.insert(stem.key(*index), value.clone());
                }
                tree.insert_stem_batch(stem, slots).unwrap();
            }
        }

        if step % check_every == 0 {
            assert_eq!(tree.root_hash().unwrap(), tree.rebuild().unwrap());
        }
    }

    for (key, value) in &reference {
        assert_eq!(tree.get(key).unwrap().as_ref(), Some(value));
    }
    let mut stems: Vec<Stem> = reference.keys().map(Key::stem).collect();
    stems.dedup();
    let store = tree.store();
    assert_eq!(store.num_leaves(), reference.len());
    assert_eq!(store.num_stems(), stems.len());
    // the root plus one stem node per stem, and branches in between
    assert!(store.num_nodes() > store.num_stems());
    assert_eq!(tree.root_hash().unwrap(), tree.rebuild().unwrap());
}
