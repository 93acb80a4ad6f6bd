use std::fmt;

use ff::Field;
use group::prime::PrimeCurveAffine;
use group::{Curve, Group};
use halo2curves::{Coordinates, CurveAffine};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::registry::CurveParams;
use super::MsmCurve;
use crate::error::{MsmError, Result};
use crate::utils::field::{biguint_to_field, field_to_biguint};

/// Affine point as integers. The identity is `(0, 0)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct G1Point {
    #[serde(with = "crate::utils::tagged")]
    pub x: BigUint,
    #[serde(with = "crate::utils::tagged")]
    pub y: BigUint,
}

impl G1Point {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self { x, y }
    }

    pub fn infinity() -> Self {
        Self::default()
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    pub fn from_affine<C: CurveAffine>(p: &C) -> Self {
        match affine_xy(p) {
            Some((x, y)) => Self::new(field_to_biguint(&x), field_to_biguint(&y)),
            None => Self::infinity(),
        }
    }

    pub fn from_curve<C: CurveAffine>(p: &C::Curve) -> Self {
        Self::from_affine::<C>(&p.to_affine())
    }

    /// Decodes into `C`, checking range, the curve equation and (for curves
    /// with a cofactor) subgroup membership.
    pub fn to_affine<C: MsmCurve>(&self, params: &CurveParams) -> Result<C> {
        if self.is_infinity() {
            return Ok(C::identity());
        }
        if self.x >= params.p || self.y >= params.p {
            return Err(MsmError::InvalidEncoding(format!(
                "coordinate of {self} is not below the {} base field modulus",
                params.id
            )));
        }
        let x = biguint_to_field::<C::Base>(&self.x);
        let y = biguint_to_field::<C::Base>(&self.y);
        let point = match (x, y) {
            (Some(x), Some(y)) => Option::<C>::from(C::from_xy(x, y)),
            _ => None,
        }
        .ok_or_else(|| MsmError::InvalidEncoding(format!("{self} is not on {}", params.id)))?;

        if !params.prime_order && !is_torsion_free(&point, &params.r) {
            return Err(MsmError::InvalidEncoding(format!(
                "{self} is not in the prime order subgroup of {}",
                params.id
            )));
        }
        Ok(point)
    }
}

impl fmt::Display for G1Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinity() {
            write!(f, "G1Point(infinity)")
        } else {
            write!(f, "G1Point({:#x}, {:#x})", self.x, self.y)
        }
    }
}

/// Affine coordinates, `None` for the identity.
pub fn affine_xy<C: CurveAffine>(p: &C) -> Option<(C::Base, C::Base)> {
    // halo2curves reports the identity as the coordinates (0, 0).
    if bool::from(p.is_identity()) {
        return None;
    }
    let coords: Option<Coordinates<C>> = p.coordinates().into();
    coords.map(|c| (*c.x(), *c.y()))
}

/// Double-and-add by an arbitrary-width integer.
pub fn mul_biguint<C: CurveAffine>(p: &C::Curve, k: &BigUint) -> C::Curve {
    let mut acc = C::Curve::identity();
    for i in (0..k.bits()).rev() {
        acc = acc.double();
        if k.bit(i) {
            acc += p;
        }
    }
    acc
}

pub fn is_torsion_free<C: CurveAffine>(p: &C, r: &BigUint) -> bool {
    bool::from(mul_biguint::<C>(&p.to_curve(), r).is_identity())
}

/// `y^2 == x^3 + ax + b`.
pub fn is_on_curve<C: CurveAffine>(x: &C::Base, y: &C::Base) -> bool {
    y.square() == x.square() * x + C::a() * x + C::b()
}
