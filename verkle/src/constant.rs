//! Constants that determine the shape of the verkle trie and its commitment basis.
use crate::types::CommitmentBytes;
use banderwagon::committer::Committer;

/// Length of a full key in bytes.
pub const KEY_LEN: usize = 32;
/// Length of a stem (the key without its suffix byte) in bytes.
pub const STEM_LEN: usize = 31;
/// Branch factor of every trie node, and the number of value slots under a stem.
pub const VERKLE_NODE_WIDTH: usize = 256;
/// Number of value slots covered by each of the two half-commitments `C1`/`C2`.
/// Slots `0..128` live in `C1`, slots `128..256` in `C2`.
pub const HALF_SLOTS: usize = VERKLE_NODE_WIDTH / 2;
/// Values are normalised to a word of this many bytes before being committed.
/// Longer values are committed through their SHA-256 digest.
pub const VALUE_WORD_LEN: usize = 32;

/// First basis index reserved for extension commitments. The extension basis is
/// disjoint from the `0..VERKLE_NODE_WIDTH` vector-commitment basis.
pub const EXTENSION_BASIS_OFFSET: usize = VERKLE_NODE_WIDTH;
/// Basis index of the constant `1` marker in an extension commitment.
pub const EXT_MARKER_INDEX: usize = EXTENSION_BASIS_OFFSET;
/// Basis index of the stem scalar in an extension commitment.
pub const EXT_STEM_INDEX: usize = EXTENSION_BASIS_OFFSET + 1;
/// Basis index of `fold(C1)` in an extension commitment.
pub const EXT_C1_INDEX: usize = EXTENSION_BASIS_OFFSET + 2;
/// Basis index of `fold(C2)` in an extension commitment.
pub const EXT_C2_INDEX: usize = EXTENSION_BASIS_OFFSET + 3;
/// Total number of generators in the commitment basis.
pub const NUM_BASIS_POINTS: usize = EXTENSION_BASIS_OFFSET + 4;

/// Seed the commitment basis is derived from.
pub const CRS_SEED: &[u8] = b"eth_verkle_oct_2021";
/// Window width used by the shared committer's precomputed tables. Wider windows
/// trade memory (exponential in the width) for fewer additions per multiplication.
pub const PRECOMP_WINDOW_SIZE: usize = 6;

/// Return the zero commitment.
pub fn zero_commitment() -> CommitmentBytes {
    Committer::zero()
}
