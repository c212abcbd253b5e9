//! Per-stem commitment state.
//!
//! A stem's 256 value slots are committed in two half-commitments, `C1` (slots
//! `0..128`) and `C2` (slots `128..256`). The stem is represented to its parent by
//! the extension commitment
//!
//! ```text
//! E = 1·G[256] + stem·G[257] + fold(C1)·G[258] + fold(C2)·G[259]
//! ```
//!
//! which uses a basis disjoint from the one the half-commitments and branches use.

use crate::{
    constant::{
        zero_commitment, EXT_C1_INDEX, EXT_C2_INDEX, EXT_MARKER_INDEX, EXT_STEM_INDEX, HALF_SLOTS,
    },
    leaf::{encode_value, in_first_half, slot_basis_indices, LeafDelta},
    types::{scalar_to_bytes, CommitmentBytes, ScalarBytes, Stem},
};
use banderwagon::{committer::Committer, crs::CRS, multi_scalar_mul, Element, Fr, PrimeField};

/// Commitment state of one stem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuffixTree {
    pub stem: Stem,
    /// Half-commitment over slots `0..128`.
    pub c1: CommitmentBytes,
    /// Half-commitment over slots `128..256`.
    pub c2: CommitmentBytes,
    /// Commitment representing the whole stem to its parent branch.
    pub extension: CommitmentBytes,
    /// Folded scalar of the extension commitment of this stem with no values.
    ///
    /// A stem that is absent from the trie contributes nothing to its parent, not
    /// the empty extension commitment, so the first update of a fresh suffix tree
    /// must report its change relative to zero.
    pub init_commitment_hash: ScalarBytes,
}

impl SuffixTree {
    /// Creates the suffix tree of a stem without any values.
    pub fn new(committer: &Committer, stem: Stem) -> Self {
        let extension = committer.commit_sparse(&[
            (EXT_MARKER_INDEX, Fr::from(1u64)),
            (EXT_STEM_INDEX, stem.to_scalar()),
        ]);

        Self {
            stem,
            c1: zero_commitment(),
            c2: zero_commitment(),
            extension: extension.to_bytes_uncompressed(),
            init_commitment_hash: scalar_to_bytes(&extension.map_to_scalar_field()),
        }
    }

    pub fn extension_element(&self) -> Element {
        Element::from_bytes_unchecked_uncompressed(self.extension)
    }

    /// Folded scalar of the extension commitment.
    pub fn folded(&self) -> Fr {
        self.extension_element().map_to_scalar_field()
    }

    /// Applies a leaf delta to the half-commitments, recombines the extension
    /// commitment, and returns the change of its folded scalar as seen by the parent.
    ///
    /// With `insert_new` the tree was just created by [`SuffixTree::new`], and the
    /// result is offset by [`SuffixTree::init_commitment_hash`] so that the parent
    /// sees `fold(E_new) - 0`.
    pub fn update_commitment(
        &mut self,
        committer: &Committer,
        delta: &LeafDelta,
        insert_new: bool,
    ) -> Fr {
        let old_extension = self.extension_element();
        let mut extension_delta = Element::zero();

        for (half, half_delta, ext_index) in [
            (&mut self.c1, delta.c1, EXT_C1_INDEX),
            (&mut self.c2, delta.c2, EXT_C2_INDEX),
        ] {
            if half_delta.is_zero() {
                continue;
            }
            let old = Element::from_bytes_unchecked_uncompressed(*half);
            let new = old + half_delta;
            extension_delta += committer.gi_mul_delta(
                &old.map_to_scalar_field(),
                &new.map_to_scalar_field(),
                ext_index,
            );
            *half = new.to_bytes_uncompressed();
        }

        let new_extension = old_extension + extension_delta;
        self.extension = new_extension.to_bytes_uncompressed();

        let mut folded_delta =
            new_extension.map_to_scalar_field() - old_extension.map_to_scalar_field();
        if insert_new {
            folded_delta += Fr::from_le_bytes_mod_order(&self.init_commitment_hash);
        }
        folded_delta
    }

    /// Computes the suffix tree of `stem` directly from its values with full
    /// multi-scalar multiplications over `crs`, without any deltas.
    pub fn from_values<'a>(
        crs: &CRS,
        stem: Stem,
        values: impl IntoIterator<Item = (u8, &'a [u8])>,
    ) -> Self {
        let mut scalars = [
            vec![Fr::from(0u64); 2 * HALF_SLOTS],
            vec![Fr::from(0u64); 2 * HALF_SLOTS],
        ];
        for (index, value) in values {
            let (low, high) = encode_value(Some(value));
            let (low_index, high_index) = slot_basis_indices(index);
            let half = if in_first_half(index) { 0 } else { 1 };
            scalars[half][low_index] = low;
            scalars[half][high_index] = high;
        }

        let basis = &crs.G[..2 * HALF_SLOTS];
        let c1 = multi_scalar_mul(basis, &scalars[0]);
        let c2 = multi_scalar_mul(basis, &scalars[1]);

        let ext_basis = &crs.G[EXT_MARKER_INDEX..=EXT_C2_INDEX];
        let empty = multi_scalar_mul(&ext_basis[..2], &[Fr::from(1u64), stem.to_scalar()]);
        let extension = multi_scalar_mul(
            ext_basis,
            &[
                Fr::from(1u64),
                stem.to_scalar(),
                c1.map_to_scalar_field(),
                c2.map_to_scalar_field(),
            ],
        );

        Self {
            stem,
            c1: c1.to_bytes_uncompressed(),
            c2: c2.to_bytes_uncompressed(),
            extension: extension.to_bytes_uncompressed(),
            init_commitment_hash: scalar_to_bytes(&empty.map_to_scalar_field()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constant::STEM_LEN,
        trie::{shared_committer, shared_crs},
    };

    fn stem() -> Stem {
        Stem([0x42; STEM_LEN])
    }

    fn same_commitments(a: &SuffixTree, b: &SuffixTree) -> bool {
        let elem = Element::from_bytes_unchecked_uncompressed;
        elem(a.c1) == elem(b.c1)
            && elem(a.c2) == elem(b.c2)
            && elem(a.extension) == elem(b.extension)
            && a.init_commitment_hash == b.init_commitment_hash
    }

    #[test]
    fn empty_tree_matches_from_scratch() {
        let fresh = SuffixTree::new(&shared_committer(), stem());
        let reference = SuffixTree::from_values(shared_crs(), stem(), []);
        assert!(same_commitments(&fresh, &reference));
        assert_eq!(fresh.init_commitment_hash, scalar_to_bytes(&fresh.folded()));
    }

    #[test]
    fn first_update_reports_change_from_zero() {
        let committer = shared_committer();
        let value = [9u8; 32];
        let mut tree = SuffixTree::new(&committer, stem());

        let delta = LeafDelta::single(&committer, 3, None, &value);
        let folded_delta = tree.update_commitment(&committer, &delta, true);

        assert_eq!(folded_delta, tree.folded());
        let reference = SuffixTree::from_values(shared_crs(), stem(), [(3, &value[..])]);
        assert!(same_commitments(&tree, &reference));
    }

    #[test]
    fn later_updates_report_relative_change() {
        let committer = shared_committer();
        let (a, b) = ([1u8; 32], [2u8; 32]);
        let mut tree = SuffixTree::new(&committer, stem());
        tree.update_commitment(&committer, &LeafDelta::single(&committer, 0, None, &a), true);

        let before = tree.folded();
        let delta = LeafDelta::single(&committer, 250, None, &b);
        let folded_delta = tree.update_commitment(&committer, &delta, false);
        assert_eq!(folded_delta, tree.folded() - before);

        let reference =
            SuffixTree::from_values(shared_crs(), stem(), [(0, &a[..]), (250, &b[..])]);
        assert!(same_commitments(&tree, &reference));
    }

    #[test]
    fn both_halves_in_one_delta() {
        let committer = shared_committer();
        let (a, b) = ([5u8; 32], [6u8; 32]);

        let mut delta = LeafDelta::default();
        delta.add_slot(&committer, 127, None, &a);
        delta.add_slot(&committer, 128, None, &b);

        let mut tree = SuffixTree::new(&committer, stem());
        tree.update_commitment(&committer, &delta, true);

        let reference =
            SuffixTree::from_values(shared_crs(), stem(), [(127, &a[..]), (128, &b[..])]);
        assert!(same_commitments(&tree, &reference));
    }

    #[test]
    fn different_stems_have_different_empty_commitments() {
        let committer = shared_committer();
        let other = Stem([0x43; STEM_LEN]);
        assert_ne!(
            SuffixTree::new(&committer, stem()).init_commitment_hash,
            SuffixTree::new(&committer, other).init_commitment_hash
        );
    }
}
