//! This module implements the verkle trie: the branch/stem entries of the branch
//! table, the per-stem suffix trees, and the [`VerkleTree`] that propagates
//! commitment deltas from a leaf up to the root.

pub mod node;
pub mod suffix;
#[allow(clippy::module_inception)]
pub mod trie;
pub use trie::{compute_from_scratch, shared_committer, shared_crs, VerkleTree};
