//! Deterministic public basis for vector commitments.
//!
//! Every generator is derived by hashing `seed || index` with SHA-256 and lifting
//! the digest to a banderwagon element, skipping digests that are not valid
//! x-coordinates. Nobody knows discrete-log relations between the points, and any
//! party can rederive them from the seed.

use crate::{try_reduce_to_element, Element};

/// Common reference string: an ordered list of value-binding generators.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct CRS {
    /// Number of generators.
    pub n: usize,
    /// The generators, indexed by basis position.
    pub G: Vec<Element>,
}

impl CRS {
    /// Derives `n` generators from `seed`.
    ///
    /// Panics if two generators coincide, which would make commitments non-binding.
    #[allow(non_snake_case)]
    pub fn new(n: usize, seed: &'static [u8]) -> CRS {
        let G = generate_random_elements(n, seed);
        CRS::assert_dedup(&G);
        CRS { n, G }
    }

    fn assert_dedup(points: &[Element]) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for point in points {
            assert!(seen.insert(point.to_bytes()), "crs has duplicated points");
        }
    }
}

fn generate_random_elements(num_required_points: usize, seed: &'static [u8]) -> Vec<Element> {
    use sha2::{Digest, Sha256};

    let hash_to_x = |index: u64| -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(index.to_be_bytes());
        hasher.finalize().to_vec()
    };

    (0u64..)
        .map(hash_to_x)
        .filter_map(|hash_bytes| try_reduce_to_element(&hash_bytes))
        .take(num_required_points)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_to_curve_is_deterministic() {
        use sha2::{Digest, Sha256};

        let points = generate_random_elements(256, b"MAKE_ETHEREUM_GREAT_AGAIN");

        assert_eq!(
            hex::encode(points[0].to_bytes()),
            "2816c0c3ac2555ec31fd5790f97bec3ec9b87d25136507bae595567416e76b80",
        );
        assert_eq!(
            hex::encode(points[255].to_bytes()),
            "046e3ca0b403c4bb91b27583d57d305945cae298ce18386cd0c0a0d5d76871ab",
        );

        let mut hasher = Sha256::new();
        for point in &points {
            hasher.update(point.to_bytes());
        }
        assert_eq!(
            hex::encode(hasher.finalize()),
            "e0d59418bbe04c1f4ec7493a9ed30497982d4ab5480d68b5e8ce426dd756d136",
        );
    }

    #[test]
    fn longer_crs_extends_shorter_one() {
        let short = CRS::new(4, b"eth_verkle_oct_2021");
        let long = CRS::new(8, b"eth_verkle_oct_2021");
        assert_eq!(short.G[..], long.G[..4]);
        assert_eq!(long.n, 8);
    }
}
