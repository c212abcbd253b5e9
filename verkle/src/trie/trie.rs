//! This module implements [`VerkleTree`].

use crate::{
    constant::{CRS_SEED, NUM_BASIS_POINTS, PRECOMP_WINDOW_SIZE, VERKLE_NODE_WIDTH},
    leaf::LeafDelta,
    mem_store::MemoryDb,
    traits::VerkleStore,
    trie::{
        node::{BranchNode, Node, StemNode},
        suffix::SuffixTree,
    },
    types::*,
};
use banderwagon::{committer::Committer, crs::CRS, multi_scalar_mul, Element, Fr, Zero};
use once_cell::sync::Lazy;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, trace};

/// Global commitment basis: the 256 vector-commitment generators followed by the
/// extension generators.
static SHARED_CRS: Lazy<CRS> = Lazy::new(|| CRS::new(NUM_BASIS_POINTS, CRS_SEED));

/// Global shared instance of the Committer to avoid repeated expensive initialization
static SHARED_COMMITTER: Lazy<Arc<Committer>> =
    Lazy::new(|| Arc::new(Committer::new(&SHARED_CRS.G, PRECOMP_WINDOW_SIZE)));

/// The commitment basis every tree in this process commits over.
pub fn shared_crs() -> &'static CRS {
    &SHARED_CRS
}

/// Handle to the process-wide committer over [`shared_crs`].
pub fn shared_committer() -> Arc<Committer> {
    Arc::clone(&SHARED_COMMITTER)
}

/// A verkle trie over a [`VerkleStore`].
///
/// Every write computes the commitment change at the leaf, walks the stem's path
/// from the root and hands a delta back up at each level, so the cost of an
/// insert is proportional to the depth of the stem and independent of how many
/// values the tree holds.
///
/// The tree assumes exclusive access to its store for the duration of each call.
#[derive(Debug)]
pub struct VerkleTree<Store = MemoryDb> {
    /// Storage backend holding the leaf, stem and branch tables.
    store: Store,
    /// Shared committer instance for cryptographic operations.
    committer: Arc<Committer>,
}

impl VerkleTree<MemoryDb> {
    /// Creates an empty tree backed by a fresh [`MemoryDb`].
    pub fn new() -> Self {
        Self::with_store(MemoryDb::new()).expect("in-memory store never fails")
    }
}

impl Default for VerkleTree<MemoryDb> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Store: VerkleStore> VerkleTree<Store> {
    /// Opens a tree over `store`, creating the empty root branch if the store does
    /// not have one yet.
    pub fn with_store(mut store: Store) -> Result<Self, VerkleError> {
        if store.node(&[]).map_err(VerkleError::store)?.is_none() {
            store
                .put_node(NodePath::new(), Node::Branch(BranchNode::new()))
                .map_err(VerkleError::store)?;
        }
        Ok(Self {
            store,
            committer: shared_committer(),
        })
    }

    /// Replaces the committer. It must have been built over [`shared_crs`] (or a
    /// prefix-compatible basis with at least [`NUM_BASIS_POINTS`] points), otherwise
    /// the commitments already in the store become meaningless.
    pub fn with_committer(mut self, committer: Arc<Committer>) -> Self {
        assert!(
            committer.num_bases() >= NUM_BASIS_POINTS,
            "committer covers {} bases, need {NUM_BASIS_POINTS}",
            committer.num_bases()
        );
        self.committer = committer;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    /// Inserts or overwrites the value under `key`.
    ///
    /// The value reaches the leaf table only once the commitments along its path
    /// have been updated.
    pub fn insert(&mut self, key: Key, value: &[u8]) -> Result<(), VerkleError> {
        let old = self.store.leaf(&key).map_err(VerkleError::store)?;
        let delta = LeafDelta::single(&self.committer, key.suffix(), old.as_deref(), value);

        self.apply(key.stem(), &delta)?;
        self.store
            .put_leaf(key, value.to_vec())
            .map_err(VerkleError::store)
    }

    /// Inserts several values under one stem with a single traversal of the trie.
    ///
    /// Equivalent to inserting every `(index, value)` pair one by one, in order: a
    /// repeated index sees the value written by its previous occurrence.
    pub fn insert_stem_batch<V: AsRef<[u8]>>(
        &mut self,
        stem: Stem,
        updates: impl IntoIterator<Item = (u8, V)>,
    ) -> Result<(), VerkleError> {
        let mut delta = LeafDelta::default();
        let mut pending: BTreeMap<u8, Value> = BTreeMap::new();
        for (index, value) in updates {
            let value = value.as_ref();
            let old = match pending.get(&index) {
                Some(previous) => Some(previous.clone()),
                None => self
                    .store
                    .leaf(&stem.key(index))
                    .map_err(VerkleError::store)?,
            };
            delta.add_slot(&self.committer, index, old.as_deref(), value);
            pending.insert(index, value.to_vec());
        }

        if pending.is_empty() {
            return Ok(());
        }
        debug!(%stem, count = pending.len(), "batch insert");
        self.apply(stem, &delta)?;

        for (index, value) in pending {
            self.store
                .put_leaf(stem.key(index), value)
                .map_err(VerkleError::store)?;
        }
        Ok(())
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &Key) -> Result<Option<Value>, VerkleError> {
        self.store.leaf(key).map_err(VerkleError::store)
    }

    /// All present slots under `stem`, ordered by suffix index.
    pub fn get_stem(&self, stem: &Stem) -> Result<Vec<(u8, Value)>, VerkleError> {
        self.store.stem_leaves(stem).map_err(VerkleError::store)
    }

    /// Uncompressed root commitment.
    pub fn root_commitment(&self) -> Result<CommitmentBytes, VerkleError> {
        Ok(self.root()?.commitment)
    }

    /// Folded scalar of the root commitment, little-endian. All zeros for an
    /// empty tree.
    pub fn root_hash(&self) -> Result<ScalarBytes, VerkleError> {
        Ok(self.root()?.hash())
    }

    /// Extension commitment of `stem`, if the stem is present.
    pub fn extension_commitment(
        &self,
        stem: &Stem,
    ) -> Result<Option<CommitmentBytes>, VerkleError> {
        Ok(self
            .store
            .suffix_tree(stem)
            .map_err(VerkleError::store)?
            .map(|tree| tree.extension))
    }

    /// Branch-table entry at `path`.
    pub fn node(&self, path: &[u8]) -> Result<Option<Node>, VerkleError> {
        self.store.node(path).map_err(VerkleError::store)
    }

    /// Recomputes the root hash from the leaf table alone, ignoring every stored
    /// commitment.
    pub fn rebuild(&self) -> Result<ScalarBytes, VerkleError> {
        compute_from_scratch(&self.store)
    }

    fn root(&self) -> Result<BranchNode, VerkleError> {
        match self.store.node(&[]).map_err(VerkleError::store)? {
            Some(Node::Branch(root)) => Ok(root),
            other => panic!("root branch missing, found {other:?}"),
        }
    }

    /// Propagates `delta` from `stem` up to the root.
    fn apply(&mut self, stem: Stem, delta: &LeafDelta) -> Result<(), VerkleError> {
        // A zero delta on an existing stem changes no commitment.
        if delta.is_zero() && self.stem_exists(&stem)? {
            trace!(%stem, "commitments unchanged");
            return Ok(());
        }

        let root_delta = self.descend(&stem, delta, 0)?;

        // The root has no parent, so its delta is added without folding.
        let mut root = self.root()?;
        root.update_commitment(root_delta);
        self.put_node(NodePath::new(), Node::Branch(root))
    }

    /// Applies `delta` to the subtree at `stem[..=depth]` and returns the change of
    /// the parent's commitment caused by it.
    fn descend(
        &mut self,
        stem: &Stem,
        delta: &LeafDelta,
        depth: usize,
    ) -> Result<Element, VerkleError> {
        let path = stem.path(depth);
        let index = stem[depth];

        match self.store.node(&path).map_err(VerkleError::store)? {
            None => {
                let (scalar, node) = self.create_stem(*stem, delta)?;
                self.put_node(path, Node::Stem(node))?;
                Ok(self.mul(&scalar, index))
            }
            Some(Node::Branch(mut branch)) => {
                let child_delta = self.descend(stem, delta, depth + 1)?;
                let scalar = branch.update_commitment(child_delta);
                trace!(depth, path = %hex::encode(&path), "branch updated");
                self.put_node(path, Node::Branch(branch))?;
                Ok(self.mul(&scalar, index))
            }
            Some(Node::Stem(node)) if node.stem == *stem => {
                let mut tree = self
                    .store
                    .suffix_tree(stem)
                    .map_err(VerkleError::store)?
                    .expect("stem node without suffix tree");
                let scalar = tree.update_commitment(&self.committer, delta, false);
                let extension = tree.extension;
                self.put_suffix_tree(tree)?;
                self.put_node(path, Node::Stem(StemNode { stem: *stem, extension }))?;
                Ok(self.mul(&scalar, index))
            }
            Some(Node::Stem(node)) => self.split(stem, delta, depth, node),
        }
    }

    /// Creates the suffix tree of a stem that is not in the trie yet and applies
    /// `delta` to it. Returns the folded scalar the stem contributes to its parent.
    fn create_stem(
        &mut self,
        stem: Stem,
        delta: &LeafDelta,
    ) -> Result<(Fr, StemNode), VerkleError> {
        let mut tree = SuffixTree::new(&self.committer, stem);
        let scalar = tree.update_commitment(&self.committer, delta, true);
        let node = StemNode {
            stem,
            extension: tree.extension,
        };
        self.put_suffix_tree(tree)?;
        debug!(%stem, "created stem");
        Ok((scalar, node))
    }

    /// Handles `stem` arriving at a path occupied by a different stem `old`.
    ///
    /// Both stems are stored one byte past their shared prefix, every path between
    /// the current one and the shared prefix becomes a fresh branch, and the
    /// returned delta replaces the old stem's contribution to the parent by that of
    /// the topmost new branch.
    fn split(
        &mut self,
        stem: &Stem,
        delta: &LeafDelta,
        depth: usize,
        old: StemNode,
    ) -> Result<Element, VerkleError> {
        let (shared, new_index, old_index) = stem
            .divergence(&old.stem)
            .expect("stems stored at same path must differ");
        debug_assert!(shared > depth, "stems diverge above their common path");
        debug!(%stem, old = %old.stem, depth, shared, "promoting stem node");

        let (new_scalar, new_node) = self.create_stem(*stem, delta)?;
        self.put_node(stem.path(shared), Node::Stem(new_node))?;
        self.put_node(old.stem.path(shared), Node::Stem(old))?;

        let old_scalar = old.element().map_to_scalar_field();
        let mut chain = self.mul(&new_scalar, new_index) + self.mul(&old_scalar, old_index);
        for len in (depth + 1..=shared).rev() {
            let mut branch = BranchNode::new();
            let scalar = branch.update_commitment(chain);
            self.put_node(stem[..len].to_vec(), Node::Branch(branch))?;
            chain = self.mul(&scalar, stem[len - 1]);
        }

        Ok(chain - self.mul(&old_scalar, stem[depth]))
    }

    fn stem_exists(&self, stem: &Stem) -> Result<bool, VerkleError> {
        Ok(self
            .store
            .suffix_tree(stem)
            .map_err(VerkleError::store)?
            .is_some())
    }

    fn mul(&self, scalar: &Fr, index: u8) -> Element {
        self.committer.mul_index(scalar, index as usize)
    }

    fn put_node(&mut self, path: NodePath, node: Node) -> Result<(), VerkleError> {
        self.store.put_node(path, node).map_err(VerkleError::store)
    }

    fn put_suffix_tree(&mut self, tree: SuffixTree) -> Result<(), VerkleError> {
        self.store.put_suffix_tree(tree).map_err(VerkleError::store)
    }
}

/// Computes the root hash of the values in `store` from scratch: every suffix tree
/// and branch commitment is rebuilt with full multi-scalar multiplications over
/// [`shared_crs`], without looking at any stored commitment.
pub fn compute_from_scratch<S: VerkleStore>(store: &S) -> Result<ScalarBytes, VerkleError> {
    let crs = shared_crs();
    let mut stems = store.stems().map_err(VerkleError::store)?;
    stems.sort_unstable();

    let mut extensions = Vec::with_capacity(stems.len());
    for stem in &stems {
        let leaves = store.stem_leaves(stem).map_err(VerkleError::store)?;
        let tree = SuffixTree::from_values(
            crs,
            *stem,
            leaves.iter().map(|(index, value)| (*index, value.as_slice())),
        );
        extensions.push(tree.extension_element());
    }
    let children: Vec<_> = stems
        .into_iter()
        .zip(Element::batch_map_to_scalar_field(&extensions))
        .collect();

    let root = subtree_commitment(crs, &children, 0);
    Ok(scalar_to_bytes(&root.map_to_scalar_field()))
}

/// Commitment of the branch at `depth` above `stems`, which are sorted and share
/// their first `depth` bytes. A stem alone under a byte is stored right there,
/// anything else gets a branch of its own.
fn subtree_commitment(crs: &CRS, stems: &[(Stem, Fr)], depth: usize) -> Element {
    let mut scalars = vec![Fr::zero(); VERKLE_NODE_WIDTH];
    let mut branches = Vec::new();
    let mut branch_indices = Vec::new();
    for group in stems.chunk_by(|a, b| a.0[depth] == b.0[depth]) {
        let index = group[0].0[depth] as usize;
        match group {
            [(_, folded)] => scalars[index] = *folded,
            _ => {
                branches.push(subtree_commitment(crs, group, depth + 1));
                branch_indices.push(index);
            }
        }
    }

    for (index, folded) in branch_indices
        .into_iter()
        .zip(Element::batch_map_to_scalar_field(&branches))
    {
        scalars[index] = folded;
    }
    multi_scalar_mul(&crs.G[..VERKLE_NODE_WIDTH], &scalars)
}
