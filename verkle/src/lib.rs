#![doc = include_str!("../README.md")]

pub mod constant;
pub mod leaf;
pub mod mem_store;
pub use mem_store::MemoryDb;
pub mod traits;
pub use traits::VerkleStore;
pub mod trie;
pub use trie::{
    compute_from_scratch,
    node::{BranchNode, Node, StemNode},
    suffix::SuffixTree,
    VerkleTree,
};
pub mod types;
pub use types::*;
