//! Fixed-basis scalar multiplication.
//!
//! Commitment updates in the trie only ever multiply a *known* generator `G[i]` by
//! a fresh scalar, so every generator gets a table of signed-window multiples up
//! front and each multiplication becomes a handful of mixed additions.

use crate::element::Element;
use ark_ec::CurveGroup;
use ark_ed_on_bls12_381_bandersnatch::{EdwardsAffine, EdwardsProjective, Fr};
use ark_ff::{AdditiveGroup, PrimeField, Zero};
use rayon::prelude::*;

/// Bit length of the scalar field modulus.
const FR_BITS: usize = 253;

/// Precomputed multiples of a fixed list of generators.
#[derive(Clone, Debug)]
pub struct Committer {
    /// Width in bits of each signed window.
    window_size: usize,
    /// Number of windows needed to cover a scalar plus its final carry.
    num_windows: usize,
    /// `tables[i][w * (half + 1) + j] = j · 2^(w · window_size) · G[i]` for
    /// `j` in `0..=half`, where `half = 2^(window_size - 1)`.
    tables: Vec<Vec<EdwardsAffine>>,
}

impl Committer {
    /// Builds the tables for `bases`. Table construction is parallelised per base.
    ///
    /// Panics unless `2 <= window_size <= 16`.
    pub fn new(bases: &[Element], window_size: usize) -> Committer {
        assert!(
            (2..=16).contains(&window_size),
            "window size {window_size} out of range"
        );
        let num_windows = FR_BITS / window_size + 1;
        let half = 1usize << (window_size - 1);

        let tables = bases
            .par_iter()
            .map(|base| {
                let mut table = Vec::with_capacity(num_windows * (half + 1));
                let mut window_base = base.0;
                for _ in 0..num_windows {
                    let mut multiple = EdwardsProjective::zero();
                    for _ in 0..=half {
                        table.push(multiple);
                        multiple += window_base;
                    }
                    for _ in 0..window_size {
                        window_base.double_in_place();
                    }
                }
                EdwardsProjective::normalize_batch(&table)
            })
            .collect();

        Committer {
            window_size,
            num_windows,
            tables,
        }
    }

    /// Uncompressed encoding of the identity element.
    pub fn zero() -> [u8; 64] {
        let mut bytes = [0u8; 64];
        // x = 0, y = 1
        bytes[32] = 1;
        bytes
    }

    /// Number of generators this committer can multiply.
    pub fn num_bases(&self) -> usize {
        self.tables.len()
    }

    /// Returns `scalar · G[g_i]`.
    ///
    /// Panics if `g_i` is not a precomputed basis index.
    pub fn mul_index(&self, scalar: &Fr, g_i: usize) -> Element {
        let table = &self.tables[g_i];
        let limbs = scalar.into_bigint().0;
        let half = 1u64 << (self.window_size - 1);
        let full = 1u64 << self.window_size;
        let row_len = half as usize + 1;

        let mut result = EdwardsProjective::zero();
        let mut carry = 0;
        for window in 0..self.num_windows {
            let digit = window_digit(&limbs, window * self.window_size, self.window_size) + carry;
            let row = &table[window * row_len..(window + 1) * row_len];
            // Digits above half are taken as (digit - 2^w), borrowing from the next window.
            if digit > half {
                result -= &row[(full - digit) as usize];
                carry = 1;
            } else {
                if digit != 0 {
                    result += &row[digit as usize];
                }
                carry = 0;
            }
        }
        debug_assert_eq!(carry, 0, "scalar wider than the precomputed windows");

        Element(result)
    }

    /// Returns `G[g_i] · (new - old)`.
    pub fn gi_mul_delta(&self, old: &Fr, new: &Fr, g_i: usize) -> Element {
        self.mul_index(&(*new - old), g_i)
    }

    /// Returns `Σ scalar · G[index]` over a sparse list of basis positions.
    pub fn commit_sparse(&self, entries: &[(usize, Fr)]) -> Element {
        entries
            .iter()
            .map(|(index, scalar)| self.mul_index(scalar, *index))
            .sum()
    }
}

/// Extracts `width` bits of a little-endian limb array starting at bit `start`.
/// Bits past the end of the array read as zero.
#[inline]
fn window_digit(limbs: &[u64; 4], start: usize, width: usize) -> u64 {
    let limb = start / 64;
    if limb >= limbs.len() {
        return 0;
    }
    let offset = start % 64;
    let mask = (1u64 << width) - 1;

    let mut digit = limbs[limb] >> offset;
    if offset + width > 64 && limb + 1 < limbs.len() {
        digit |= limbs[limb + 1] << (64 - offset);
    }
    digit & mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CRS;
    use ark_ff::UniformRand;
    use rand::{rngs::StdRng, SeedableRng};

    fn bases() -> Vec<Element> {
        CRS::new(4, b"committer_test").G
    }

    #[test]
    fn zero_is_identity_encoding() {
        assert_eq!(Committer::zero(), Element::zero().to_bytes_uncompressed());
    }

    #[test]
    fn mul_index_matches_plain_scalar_mul() {
        let bases = bases();
        let mut rng = StdRng::seed_from_u64(7);
        for window_size in [2, 4, 6, 11] {
            let committer = Committer::new(&bases, window_size);
            assert_eq!(committer.num_bases(), bases.len());
            for i in 0..bases.len() {
                let scalar = Fr::rand(&mut rng);
                assert_eq!(committer.mul_index(&scalar, i), bases[i] * scalar);
            }
            // edge scalars: 0, 1 and -1 (largest field element)
            for scalar in [Fr::zero(), Fr::from(1u64), -Fr::from(1u64)] {
                assert_eq!(committer.mul_index(&scalar, 0), bases[0] * scalar);
            }
        }
    }

    #[test]
    fn delta_and_sparse_commit() {
        let bases = bases();
        let committer = Committer::new(&bases, 5);
        let (old, new) = (Fr::from(10u64), Fr::from(3u64));

        assert_eq!(
            committer.gi_mul_delta(&old, &new, 2),
            bases[2] * (new - old)
        );

        let entries = [(0, Fr::from(2u64)), (3, Fr::from(9u64))];
        assert_eq!(
            committer.commit_sparse(&entries),
            bases[0] * Fr::from(2u64) + bases[3] * Fr::from(9u64)
        );
        assert!(committer.commit_sparse(&[]).is_zero());
    }

    #[test]
    fn window_digit_spans_limbs() {
        let limbs = [u64::MAX, 0b101, 0, 0];
        assert_eq!(window_digit(&limbs, 0, 4), 0b1111);
        // bits 62..66 = 1,1 from limb 0 then 1,0 from limb 1
        assert_eq!(window_digit(&limbs, 62, 4), 0b0111);
        assert_eq!(window_digit(&limbs, 300, 4), 0);
    }
}
