//! Internal trie entries stored in the branch table.
use crate::{
    constant::zero_commitment,
    types::{hash_commitment, CommitmentBytes, ScalarBytes, Stem},
};
use banderwagon::{Element, Fr};

/// A 256-way internal node.
///
/// Its commitment is `Σ fold(child_i) · G[i]` over the present children, kept
/// up to date purely through deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchNode {
    pub commitment: CommitmentBytes,
}

impl Default for BranchNode {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchNode {
    /// A branch without children (identity commitment).
    pub fn new() -> Self {
        Self {
            commitment: zero_commitment(),
        }
    }

    pub fn element(&self) -> Element {
        Element::from_bytes_unchecked_uncompressed(self.commitment)
    }

    /// Folded-scalar encoding of the commitment.
    pub fn hash(&self) -> ScalarBytes {
        hash_commitment(self.commitment)
    }

    /// Adds a raw child delta to the commitment and returns how much the folded
    /// scalar of the commitment moved, for the parent to scale by this node's
    /// selecting byte. Constant time in the number of children.
    pub fn update_commitment(&mut self, delta: Element) -> Fr {
        let old = self.element();
        let new = old + delta;
        self.commitment = new.to_bytes_uncompressed();
        new.map_to_scalar_field() - old.map_to_scalar_field()
    }
}

/// Marks that a stem lives directly under a path, with no further branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StemNode {
    pub stem: Stem,
    /// Snapshot of the stem's extension commitment.
    pub extension: CommitmentBytes,
}

impl StemNode {
    pub fn element(&self) -> Element {
        Element::from_bytes_unchecked_uncompressed(self.extension)
    }
}

/// Entry of the branch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Branch(BranchNode),
    Stem(StemNode),
}

impl Node {
    /// The commitment this entry contributes (before folding) to its parent.
    pub fn commitment(&self) -> CommitmentBytes {
        match self {
            Node::Branch(branch) => branch.commitment,
            Node::Stem(stem) => stem.extension,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    pub fn as_stem(&self) -> Option<&StemNode> {
        match self {
            Node::Stem(stem) => Some(stem),
            Node::Branch(_) => None,
        }
    }
}
