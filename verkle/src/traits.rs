//! Storage abstraction for the three tables a verkle trie is made of.
use crate::{
    trie::{node::Node, suffix::SuffixTree},
    types::{Key, NodePath, Stem, Value},
};
use std::fmt::Debug;

/// Backend holding the leaf table, the stem table and the branch table.
///
/// The tables are independent: there is no atomicity across them, and writes are
/// visible to the very next read. The trie only writes a table entry once the
/// commitment delta it depends on has been fully computed.
pub trait VerkleStore: Debug {
    /// Custom trait's error type.
    type Error: Debug + Send;

    /// Raw value stored under `key`, if any.
    fn leaf(&self, key: &Key) -> Result<Option<Value>, Self::Error>;

    /// Inserts or overwrites the value under `key`.
    fn put_leaf(&mut self, key: Key, value: Value) -> Result<(), Self::Error>;

    /// All present slots under `stem`, ordered by suffix index.
    fn stem_leaves(&self, stem: &Stem) -> Result<Vec<(u8, Value)>, Self::Error>;

    /// Every stem that has at least one value in the leaf table, in ascending order.
    fn stems(&self) -> Result<Vec<Stem>, Self::Error>;

    /// Commitment state of `stem`, if the stem has been inserted.
    fn suffix_tree(&self, stem: &Stem) -> Result<Option<SuffixTree>, Self::Error>;

    /// Inserts or overwrites the commitment state of `tree.stem`.
    fn put_suffix_tree(&mut self, tree: SuffixTree) -> Result<(), Self::Error>;

    /// Branch-table entry at `path`. The root lives at the empty path.
    fn node(&self, path: &[u8]) -> Result<Option<Node>, Self::Error>;

    /// Inserts or replaces the branch-table entry at `path`.
    fn put_node(&mut self, path: NodePath, node: Node) -> Result<(), Self::Error>;
}
