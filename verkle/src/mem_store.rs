//! In-memory storage backend for the verkle trie.
//!
//! [`MemoryDb`] is not the trie itself: it only holds the three tables the trie
//! reads and writes. It is volatile (no durability of any kind) and intended for
//! tests, tooling and as the reference implementation of [`VerkleStore`].
use crate::{
    traits::VerkleStore,
    trie::{node::Node, suffix::SuffixTree},
    types::{Key, NodePath, Stem, Value},
};
use std::{collections::BTreeMap, convert::Infallible};

/// In-memory storage backend for the verkle trie.
///
/// All three maps are [`BTreeMap`]s, so iteration (and therefore rebuilding the
/// trie from scratch) is deterministic.
#[derive(Debug, Default, Clone)]
pub struct MemoryDb {
    /// Key to raw value bytes. Authoritative source for reads.
    leaves: BTreeMap<Key, Value>,
    /// Stem to its commitment state.
    stems: BTreeMap<Stem, SuffixTree>,
    /// Path to branch or stem entry.
    nodes: BTreeMap<NodePath, Node>,
}

impl MemoryDb {
    /// Creates an empty store. Note that the trie, not the store, creates the root.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    pub fn num_stems(&self) -> usize {
        self.stems.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

impl VerkleStore for MemoryDb {
    type Error = Infallible;

    fn leaf(&self, key: &Key) -> Result<Option<Value>, Self::Error> {
        Ok(self.leaves.get(key).cloned())
    }

    fn put_leaf(&mut self, key: Key, value: Value) -> Result<(), Self::Error> {
        self.leaves.insert(key, value);
        Ok(())
    }

    fn stem_leaves(&self, stem: &Stem) -> Result<Vec<(u8, Value)>, Self::Error> {
        Ok(self
            .leaves
            .range(stem.key(0)..=stem.key(u8::MAX))
            .map(|(key, value)| (key.suffix(), value.clone()))
            .collect())
    }

    fn stems(&self) -> Result<Vec<Stem>, Self::Error> {
        let mut stems: Vec<Stem> = self.leaves.keys().map(Key::stem).collect();
        // keys are sorted, so equal stems are adjacent
        stems.dedup();
        Ok(stems)
    }

    fn suffix_tree(&self, stem: &Stem) -> Result<Option<SuffixTree>, Self::Error> {
        Ok(self.stems.get(stem).copied())
    }

    fn put_suffix_tree(&mut self, tree: SuffixTree) -> Result<(), Self::Error> {
        self.stems.insert(tree.stem, tree);
        Ok(())
    }

    fn node(&self, path: &[u8]) -> Result<Option<Node>, Self::Error> {
        Ok(self.nodes.get(path).copied())
    }

    fn put_node(&mut self, path: NodePath, node: Node) -> Result<(), Self::Error> {
        self.nodes.insert(path, node);
        Ok(())
    }
}
