//! Banderwagon group arithmetic used by the verkle trie.
//!
//! Banderwagon is the prime-order quotient of the Bandersnatch curve in which
//! `(x, y)` and `(-x, -y)` are the same element. This crate exposes exactly the
//! primitives the trie relies on:
//!
//! - [`Element`] with group addition, subtraction and scalar multiplication by [`Fr`]
//! - [`Element::map_to_scalar_field`], the deterministic fold of a group element into
//!   the scalar field used whenever a commitment becomes an input one level up
//! - [`crs::CRS`], the deterministic public basis
//! - [`committer::Committer`], fixed-basis scalar multiplication backed by
//!   precomputed tables

pub mod committer;
pub mod crs;
mod element;
mod trait_impls;

pub use ark_ed_on_bls12_381_bandersnatch::Fr;
pub use ark_ff::{PrimeField, Zero};
pub use ark_serialize::CanonicalSerialize;
pub use element::{multi_scalar_mul, Element};

/// Interprets `bytes` as a big-endian base field element and tries to lift it to a
/// banderwagon element. Returns `None` when no valid point has that x-coordinate.
pub fn try_reduce_to_element(bytes: &[u8]) -> Option<Element> {
    use ark_ed_on_bls12_381_bandersnatch::Fq;

    let x = Fq::from_be_bytes_mod_order(bytes);
    let mut bytes = [0u8; 32];
    x.serialize_compressed(&mut bytes[..])
        .expect("could not serialize base field element");

    // Element::from_bytes expects big endian
    bytes.reverse();
    Element::from_bytes(bytes)
}
