//! Core data types for the verkle trie.
//!
//! - [`Key`]: 32-byte identifier of a value slot
//! - [`Stem`]: the first 31 bytes of a key, naming a group of 256 slots
//! - [`NodePath`]: a byte prefix of a stem addressing an internal trie entry
//! - Cryptographic types: [`CommitmentBytes`] and [`ScalarBytes`]

use crate::constant::{KEY_LEN, STEM_LEN};
use banderwagon::{CanonicalSerialize, Element, Fr, PrimeField};
use derive_more::{Deref, From};
use std::fmt;
use thiserror::Error;

/// 64-byte uncompressed group element for cryptographic commitments.
pub type CommitmentBytes = [u8; 64];

/// 32-byte scalar field element for cryptographic commitments.
pub type ScalarBytes = [u8; 32];

/// Path from the root to an internal trie entry: a prefix of some stem.
/// The root lives at the empty path.
pub type NodePath = Vec<u8>;

/// Raw value bytes as stored in the leaf table.
pub type Value = Vec<u8>;

/// Hash a 64-byte commitment into its 32-byte folded-scalar encoding.
pub fn hash_commitment(commitment: CommitmentBytes) -> ScalarBytes {
    scalar_to_bytes(&Element::from_bytes_unchecked_uncompressed(commitment).map_to_scalar_field())
}

/// Little-endian canonical encoding of a scalar.
pub fn scalar_to_bytes(scalar: &Fr) -> ScalarBytes {
    let mut bytes = [0u8; 32];
    scalar
        .serialize_compressed(&mut bytes[..])
        .expect("Failed to serialize scalar to bytes");
    bytes
}

/// Unified error type for verkle trie operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerkleError {
    /// A key or stem of the wrong width was handed across the API boundary.
    #[error("Invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The storage backend failed.
    #[error("Storage backend error: {message}")]
    Store { message: String },
}

impl VerkleError {
    pub(crate) fn store<E: fmt::Debug>(err: E) -> Self {
        VerkleError::Store {
            message: format!("{err:?}"),
        }
    }
}

/// The 31-byte prefix of a key, identifying a group of 256 value slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, From)]
pub struct Stem(pub [u8; STEM_LEN]);

impl Stem {
    /// Builds the key of slot `suffix` under this stem.
    pub fn key(&self, suffix: u8) -> Key {
        let mut key = [0u8; KEY_LEN];
        key[..STEM_LEN].copy_from_slice(&self.0);
        key[STEM_LEN] = suffix;
        Key(key)
    }

    /// The stem read as a little-endian integer. Always below the field modulus.
    pub fn to_scalar(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.0)
    }

    /// The path of the trie entry at `depth`, i.e. the first `depth + 1` bytes.
    pub fn path(&self, depth: usize) -> NodePath {
        self.0[..=depth].to_vec()
    }

    /// Length of the longest common byte prefix of two stems, together with the
    /// first differing byte of each (`self`'s first). `None` if the stems are equal.
    pub fn divergence(&self, other: &Stem) -> Option<(usize, u8, u8)> {
        self.0
            .iter()
            .zip(other.0.iter())
            .position(|(a, b)| a != b)
            .map(|i| (i, self.0[i], other.0[i]))
    }
}

impl TryFrom<&[u8]> for Stem {
    type Error = VerkleError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let stem = bytes.try_into().map_err(|_| VerkleError::InvalidLength {
            what: "stem",
            expected: STEM_LEN,
            actual: bytes.len(),
        })?;
        Ok(Stem(stem))
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stem({self})")
    }
}

/// A 32-byte key: a [`Stem`] followed by a one-byte suffix index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, From)]
pub struct Key(pub [u8; KEY_LEN]);

impl Key {
    pub fn stem(&self) -> Stem {
        let mut stem = [0u8; STEM_LEN];
        stem.copy_from_slice(&self.0[..STEM_LEN]);
        Stem(stem)
    }

    /// Index of the value slot under the stem.
    pub fn suffix(&self) -> u8 {
        self.0[STEM_LEN]
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = VerkleError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key = bytes.try_into().map_err(|_| VerkleError::InvalidLength {
            what: "key",
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Key(key))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::zero_commitment;

    #[test]
    fn key_splits_into_stem_and_suffix() {
        let mut bytes = [7u8; KEY_LEN];
        bytes[STEM_LEN] = 200;
        let key = Key(bytes);

        assert_eq!(key.stem(), Stem([7u8; STEM_LEN]));
        assert_eq!(key.suffix(), 200);
        assert_eq!(key.stem().key(200), key);
    }

    #[test]
    fn boundary_lengths_are_checked() {
        assert_eq!(
            Key::try_from(&[0u8; 31][..]),
            Err(VerkleError::InvalidLength {
                what: "key",
                expected: 32,
                actual: 31
            })
        );
        assert!(Key::try_from(&[0u8; 32][..]).is_ok());
        assert!(Stem::try_from(&[0u8; 32][..]).is_err());
        assert_eq!(Stem::try_from(&[1u8; 31][..]), Ok(Stem([1u8; 31])));
    }

    #[test]
    fn divergence_reports_first_differing_byte() {
        let a = Stem([0u8; STEM_LEN]);
        let mut b = a;
        b.0[5] = 3;

        assert_eq!(a.divergence(&b), Some((5, 0, 3)));
        assert_eq!(b.divergence(&a), Some((5, 3, 0)));
        assert_eq!(a.divergence(&a), None);
    }

    #[test]
    fn stem_scalar_is_little_endian() {
        let mut stem = [0u8; STEM_LEN];
        stem[0] = 2;
        stem[1] = 1;
        assert_eq!(Stem(stem).to_scalar(), Fr::from(258u64));
        assert_eq!(Stem(stem).path(1), vec![2, 1]);
    }

    #[test]
    fn zero_commitment_hashes_to_zero() {
        assert_eq!(hash_commitment(zero_commitment()), [0u8; 32]);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(
            Stem([0xab; STEM_LEN]).to_string(),
            format!("0x{}", "ab".repeat(STEM_LEN))
        );
    }
}
