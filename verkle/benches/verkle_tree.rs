//! Verkle Tree Performance Benchmarks
//!
//! Measures the incremental insert path against batched inserts and against the
//! full recomputation of the root:
//!
//! - **Single inserts**: one traversal per key
//! - **Stem batches**: one traversal per stem, regardless of how many slots change
//! - **Rebuild**: recomputation of every commitment from the leaf table
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench --package verkle --bench verkle_tree
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use verkle::{compute_from_scratch, Key, Stem, VerkleTree};

/// Generates `num` random keys with 32-byte random values.
fn gen_kvs(num: usize, rng: &mut StdRng) -> Vec<(Key, [u8; 32])> {
    (0..num).map(|_| (Key(rng.gen()), rng.gen())).collect()
}

/// Generates `num_stems` random stems with `per_stem` random slots each.
fn gen_stem_batches(
    num_stems: usize,
    per_stem: usize,
    rng: &mut StdRng,
) -> Vec<(Stem, Vec<(u8, [u8; 32])>)> {
    (0..num_stems)
        .map(|_| {
            let slots = (0..per_stem).map(|_| (rng.gen(), rng.gen())).collect();
            (Stem(rng.gen()), slots)
        })
        .collect()
}

fn benchmark_inserts(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    // Pre-initialize cryptographic precomputation tables for consistent timing
    let _ = VerkleTree::new();

    c.bench_function("verkle insert 1k KVs", |b| {
        b.iter_batched(
            || gen_kvs(1_000, &mut rng),
            |kvs| {
                let mut tree = VerkleTree::new();
                for (key, value) in kvs {
                    tree.insert(key, &value).unwrap();
                }
                black_box(tree.root_hash().unwrap())
            },
            BatchSize::SmallInput,
        );
    });

    // Same number of values as above, spread over 1/16 as many stems
    c.bench_function("verkle stem batch 64 * 16 KVs", |b| {
        b.iter_batched(
            || gen_stem_batches(64, 16, &mut rng),
            |batches| {
                let mut tree = VerkleTree::new();
                for (stem, slots) in batches {
                    tree.insert_stem_batch(stem, slots).unwrap();
                }
                black_box(tree.root_hash().unwrap())
            },
            BatchSize::SmallInput,
        );
    });

    // Updates on an already populated tree, where every insert walks existing branches
    let mut populated = VerkleTree::new();
    for (key, value) in gen_kvs(10_000, &mut rng) {
        populated.insert(key, &value).unwrap();
    }
    c.bench_function("verkle update 100 KVs on 10k tree", |b| {
        b.iter_batched(
            || gen_kvs(100, &mut rng),
            |kvs| {
                for (key, value) in kvs {
                    populated.insert(key, &value).unwrap();
                }
                black_box(populated.root_hash().unwrap())
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_rebuild(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);

    for num_kvs in [1_000, 10_000] {
        let mut tree = VerkleTree::new();
        for (key, value) in gen_kvs(num_kvs, &mut rng) {
            tree.insert(key, &value).unwrap();
        }
        let store = tree.into_store();

        c.bench_function(&format!("rebuild {num_kvs} KVs"), |b| {
            b.iter(|| black_box(compute_from_scratch(&store).unwrap()));
        });
    }
}

criterion_group!(benches, benchmark_inserts, benchmark_rebuild);
criterion_main!(benches);
