use ark_ec::{twisted_edwards::TECurveConfig, CurveGroup, PrimeGroup, VariableBaseMSM};
use ark_ed_on_bls12_381_bandersnatch::{BandersnatchConfig, EdwardsAffine, EdwardsProjective, Fq};
use ark_ff::{batch_inversion, Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

pub use ark_ed_on_bls12_381_bandersnatch::Fr;

/// A banderwagon group element.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Element(pub(crate) EdwardsProjective);

impl PartialEq for Element {
    /// Equality in the quotient group: `(x, y)` and `(-x, -y)` are the same element,
    /// so we compare `x₁/y₁` with `x₂/y₂` without dividing.
    fn eq(&self, other: &Self) -> bool {
        (self.0.x * other.0.y) == (other.0.x * self.0.y)
    }
}

impl Element {
    /// The identity element.
    pub fn zero() -> Element {
        Element(EdwardsProjective::zero())
    }

    pub fn is_zero(&self) -> bool {
        *self == Element::zero()
    }

    pub fn prime_subgroup_generator() -> Element {
        Element(EdwardsProjective::generator())
    }

    /// Canonical 32-byte big-endian encoding `sign(y) · x`.
    ///
    /// Both representatives of an element serialize to the same bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let affine = EdwardsAffine::from(self.0);
        let x = if is_positive(affine.y) {
            affine.x
        } else {
            -affine.x
        };
        let mut bytes = [0u8; 32];
        x.serialize_compressed(&mut bytes[..])
            .expect("serialization failed");

        // arkworks is little endian
        bytes.reverse();
        bytes
    }

    /// Decodes the output of [`Element::to_bytes`], rejecting x-coordinates that are
    /// not on the curve or not in the prime-order subgroup.
    pub fn from_bytes(mut bytes: [u8; 32]) -> Option<Element> {
        bytes.reverse();

        let x = Fq::deserialize_compressed(&bytes[..]).ok()?;
        let point = Self::get_point_from_x(x, true)?;
        if !subgroup_check(&point) {
            return None;
        }

        Some(Element(point))
    }

    /// 64-byte uncompressed encoding (x and y, little endian).
    ///
    /// This is *not* canonical in the quotient group; compare elements with `==`
    /// or [`Element::to_bytes`], never through this encoding.
    pub fn to_bytes_uncompressed(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        self.0
            .serialize_uncompressed(&mut bytes[..])
            .expect("cannot serialize point as an uncompressed byte array");
        bytes
    }

    /// Decodes the output of [`Element::to_bytes_uncompressed`] without validation.
    ///
    /// Only for bytes this process produced itself (e.g. commitments held in the
    /// trie store). Panics if the bytes are not a point encoding at all.
    pub fn from_bytes_unchecked_uncompressed(bytes: [u8; 64]) -> Self {
        let point = EdwardsProjective::deserialize_uncompressed_unchecked(&bytes[..])
            .expect("could not deserialize byte array into a point");

        debug_assert!(
            EdwardsAffine::from(point).is_on_curve() && subgroup_check(&point),
            "received invalid banderwagon element"
        );

        Self(point)
    }

    /// Solves `ax² + y² = 1 + dx²y²` for `y` and picks the requested sign.
    fn get_point_from_x(x: Fq, choose_largest: bool) -> Option<EdwardsProjective> {
        let x_sq = x.square();
        let y_squared = (BandersnatchConfig::COEFF_A * x_sq - Fq::one())
            / (BandersnatchConfig::COEFF_D * x_sq - Fq::one());

        let y = y_squared.sqrt()?;
        let y = if is_positive(y) == choose_largest {
            y
        } else {
            -y
        };

        Some(EdwardsAffine::new_unchecked(x, y).into())
    }

    fn map_to_field(&self) -> Fq {
        self.0.x / self.0.y
    }

    /// Folds a group element into the scalar field: `x/y` read as a scalar.
    ///
    /// Two-to-one on the curve, but both preimages are the same banderwagon element.
    /// The identity folds to zero.
    pub fn map_to_scalar_field(&self) -> Fr {
        let base_field = self.map_to_field();

        let mut bytes = [0u8; 32];
        base_field
            .serialize_compressed(&mut bytes[..])
            .expect("could not serialize point into a 32 byte array");
        Fr::from_le_bytes_mod_order(&bytes)
    }

    /// Same as calling [`Element::map_to_scalar_field`] on every element, sharing a
    /// single field inversion.
    pub fn batch_map_to_scalar_field(elements: &[Element]) -> Vec<Fr> {
        let mut inv_y: Vec<Fq> = elements.iter().map(|element| element.0.y).collect();
        batch_inversion(&mut inv_y);

        inv_y
            .into_iter()
            .zip(elements)
            .map(|(inv_y, element)| {
                let mut bytes = [0u8; 32];
                (inv_y * element.0.x)
                    .serialize_compressed(&mut bytes[..])
                    .expect("could not serialize point into a 32 byte array");
                Fr::from_le_bytes_mod_order(&bytes)
            })
            .collect()
    }
}

// The lexicographically largest value is the positive one
fn is_positive(coordinate: Fq) -> bool {
    coordinate > -coordinate
}

/// Subgroup membership: `1 - ax²` must be a quadratic residue.
///
/// Assumes the point is on the curve.
fn subgroup_check(point: &EdwardsProjective) -> bool {
    (Fq::one() - BandersnatchConfig::COEFF_A * point.x.square())
        .legendre()
        .is_qr()
}

/// Variable-base multi-scalar multiplication `Σ scalars[i] · bases[i]`.
///
/// Panics if the two slices differ in length.
pub fn multi_scalar_mul(bases: &[Element], scalars: &[Fr]) -> Element {
    let projective: Vec<_> = bases.iter().map(|element| element.0).collect();
    let affine = EdwardsProjective::normalize_batch(&projective);

    let result = EdwardsProjective::msm(&affine, scalars)
        .expect("number of bases should equal number of scalars");

    Element(result)
}
