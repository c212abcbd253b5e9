//! Operator overloads for [`Element`].
//!
//! These are the only group operations the commitment code needs: add, subtract,
//! negate, sum and multiply by a scalar.
use crate::Element;
use ark_ed_on_bls12_381_bandersnatch::Fr;

use std::{
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

impl Mul<Fr> for Element {
    type Output = Element;

    fn mul(self, rhs: Fr) -> Self::Output {
        Element(self.0 * rhs)
    }
}

impl Add<Element> for Element {
    type Output = Element;

    fn add(self, rhs: Element) -> Self::Output {
        Element(self.0 + rhs.0)
    }
}

impl AddAssign<Element> for Element {
    fn add_assign(&mut self, rhs: Element) {
        self.0 += rhs.0
    }
}

impl Sub<Element> for Element {
    type Output = Element;

    fn sub(self, rhs: Element) -> Self::Output {
        Element(self.0 - rhs.0)
    }
}

impl SubAssign<Element> for Element {
    fn sub_assign(&mut self, rhs: Element) {
        self.0 -= rhs.0
    }
}

impl Neg for Element {
    type Output = Element;

    fn neg(self) -> Self::Output {
        Element(-self.0)
    }
}

/// The empty sum is the identity.
impl Sum for Element {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Element(iter.map(|element| element.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_neg_are_consistent() {
        let g = Element::prime_subgroup_generator();
        let a = g * Fr::from(9u64);
        let b = g * Fr::from(4u64);

        assert_eq!(a - b, g * Fr::from(5u64));
        assert_eq!(a + (-a), Element::zero());

        let mut c = a;
        c += b;
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn sum_of_nothing_is_identity() {
        let total: Element = std::iter::empty().sum();
        assert!(total.is_zero());
    }
}
