//! Leaf-level commitment deltas.
//!
//! Every value slot `i` under a stem contributes two scalars to one of the stem's
//! half-commitments: the low half of the value at basis position `2·(i mod 128)`
//! and the high half at `2·(i mod 128) + 1`. Slots `0..128` belong to `C1`, the
//! rest to `C2`. Changing a value therefore changes exactly one half-commitment by
//! `(newLow - oldLow)·G[2j] + (newHigh - oldHigh)·G[2j+1]`.

use crate::constant::{HALF_SLOTS, VALUE_WORD_LEN};
use banderwagon::{committer::Committer, Element, Fr, PrimeField, Zero};
use sha2::{Digest, Sha256};

/// Normalises a value to the 32-byte word that gets committed.
pub fn value_word(value: &[u8]) -> [u8; VALUE_WORD_LEN] {
    let mut word = [0u8; VALUE_WORD_LEN];
    if value.len() <= VALUE_WORD_LEN {
        word[..value.len()].copy_from_slice(value);
    } else {
        word.copy_from_slice(&Sha256::digest(value));
    }
    word
}

/// Splits a value into its `(low, high)` scalars. An absent value is `(0, 0)`.
///
/// The low half carries a `2^128` marker so that a present all-zero value is
/// distinguishable from an absent one.
pub fn encode_value(value: Option<&[u8]>) -> (Fr, Fr) {
    let Some(value) = value else {
        return (Fr::zero(), Fr::zero());
    };
    let word = value_word(value);

    let mut low = [0u8; 17];
    low[..16].copy_from_slice(&word[..16]);
    low[16] = 1;

    (
        Fr::from_le_bytes_mod_order(&low),
        Fr::from_le_bytes_mod_order(&word[16..]),
    )
}

/// Basis positions of the low and high halves of slot `index` inside its
/// half-commitment.
#[inline]
pub fn slot_basis_indices(index: u8) -> (usize, usize) {
    let j = index as usize % HALF_SLOTS;
    (2 * j, 2 * j + 1)
}

/// Returns `true` if slot `index` is committed in `C1`, `false` for `C2`.
#[inline]
pub fn in_first_half(index: u8) -> bool {
    (index as usize) < HALF_SLOTS
}

/// Group-element change of the half-commitment holding slot `index` when its
/// value goes from `old` to `new`.
pub fn slot_delta(committer: &Committer, index: u8, old: Option<&[u8]>, new: &[u8]) -> Element {
    let (old_low, old_high) = encode_value(old);
    let (new_low, new_high) = encode_value(Some(new));
    let (low_index, high_index) = slot_basis_indices(index);

    committer.gi_mul_delta(&old_low, &new_low, low_index)
        + committer.gi_mul_delta(&old_high, &new_high, high_index)
}

/// Accumulated change of both half-commitments of a single stem.
///
/// A single group element cannot be routed to two half-commitments after it has
/// been summed, so the accumulator keeps one delta per half.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafDelta {
    /// Change of `C1` (slots `0..128`).
    pub c1: Element,
    /// Change of `C2` (slots `128..256`).
    pub c2: Element,
}

impl Default for LeafDelta {
    fn default() -> Self {
        Self {
            c1: Element::zero(),
            c2: Element::zero(),
        }
    }
}

impl LeafDelta {
    /// Adds the contribution of one slot change.
    pub fn add_slot(&mut self, committer: &Committer, index: u8, old: Option<&[u8]>, new: &[u8]) {
        let delta = slot_delta(committer, index, old, new);
        if in_first_half(index) {
            self.c1 += delta;
        } else {
            self.c2 += delta;
        }
    }

    /// Delta of a single slot change.
    pub fn single(committer: &Committer, index: u8, old: Option<&[u8]>, new: &[u8]) -> Self {
        let mut delta = Self::default();
        delta.add_slot(committer, index, old, new);
        delta
    }

    pub fn is_zero(&self) -> bool {
        self.c1.is_zero() && self.c2.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::shared_committer;

    fn two_pow_128() -> Fr {
        Fr::from(u128::MAX) + Fr::from(1u64)
    }

    #[test]
    fn absent_and_zero_values_differ() {
        assert_eq!(encode_value(None), (Fr::zero(), Fr::zero()));

        let (low, high) = encode_value(Some(&[0u8; 32][..]));
        assert_eq!(low, two_pow_128());
        assert!(high.is_zero());

        // the empty value pads to the all-zero word
        assert_eq!(encode_value(Some(&[0u8; 0][..])), encode_value(Some(&[0u8; 32][..])));
    }

    #[test]
    fn halves_are_little_endian() {
        let mut value = [0u8; 32];
        value[0] = 5;
        value[16] = 9;
        let (low, high) = encode_value(Some(&value[..]));
        assert_eq!(low, Fr::from(5u64) + two_pow_128());
        assert_eq!(high, Fr::from(9u64));
    }

    #[test]
    fn long_values_are_digested() {
        let long = vec![1u8; 100];
        assert_eq!(value_word(&long)[..], Sha256::digest(&long)[..]);
        assert_ne!(encode_value(Some(&long[..])), encode_value(Some(&long[..32])));
    }

    #[test]
    fn slot_positions_wrap_per_half() {
        assert_eq!(slot_basis_indices(0), (0, 1));
        assert_eq!(slot_basis_indices(127), (254, 255));
        assert_eq!(slot_basis_indices(128), (0, 1));
        assert!(in_first_half(127));
        assert!(!in_first_half(128));
    }

    #[test]
    fn slot_delta_matches_direct_commitment() {
        let committer = shared_committer();
        let value = [3u8; 32];
        let (low, high) = encode_value(Some(&value[..]));

        let expected = committer.mul_index(&low, 10) + committer.mul_index(&high, 11);
        assert_eq!(slot_delta(&committer, 5, None, &value), expected);
        assert_eq!(slot_delta(&committer, 133, None, &value), expected);
    }

    #[test]
    fn deltas_telescope() {
        let committer = shared_committer();
        let (a, b, c) = ([1u8; 32], [2u8; 32], [3u8; 32]);

        let direct = slot_delta(&committer, 7, Some(&a[..]), &c);
        let stepped = slot_delta(&committer, 7, Some(&a[..]), &b)
            + slot_delta(&committer, 7, Some(&b[..]), &c);
        assert_eq!(direct, stepped);
        assert!(slot_delta(&committer, 7, Some(&a[..]), &a).is_zero());
    }

    #[test]
    fn leaf_delta_routes_by_half() {
        let committer = shared_committer();
        let value = [4u8; 32];

        let low = LeafDelta::single(&committer, 1, None, &value);
        assert!(!low.c1.is_zero());
        assert!(low.c2.is_zero());

        let high = LeafDelta::single(&committer, 200, None, &value);
        assert!(high.c1.is_zero());
        assert!(!high.c2.is_zero());

        assert!(LeafDelta::default().is_zero());
    }
}
