use ff::Field;
use group::{Curve, Group};
use halo2curves::CurveAffine;
use num_bigint::BigUint;

use super::digits::{neg3_digits, N_DIGITS};
use super::divisor::construct_function;
use crate::algebra::{CurveEquation, RationalFunction};
use crate::error::{MsmError, Result};

/// Claimed `Q = Σ s_i·P_i` together with the witness `Σ_k (-3)^k·dlog(D_k)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcipHint<C: CurveAffine> {
    pub q: C,
    pub sum_dlog: RationalFunction<C::Base>,
}

/// `Q_k` for `k = 0..=N_DIGITS`, with `Q_{N_DIGITS} = O` and
/// `Q_k = -3·Q_{k+1} + Σ_i d_{i,k}·P_i`.
fn accumulation_levels<C: CurveAffine>(points: &[C], digits: &[Vec<i8>]) -> Vec<C> {
    let mut levels = vec![C::Curve::identity(); N_DIGITS + 1];
    for k in (0..N_DIGITS).rev() {
        let prev = levels[k + 1];
        let mut acc = -(prev.double() + prev);
        for (p, d) in points.iter().zip(digits.iter()) {
            match d[k] {
                1 => acc += p.to_curve(),
                -1 => acc -= p.to_curve(),
                _ => {}
            }
        }
        levels[k] = acc;
    }
    let mut affine = vec![C::identity(); levels.len()];
    C::Curve::batch_normalize(&levels, &mut affine);
    affine
}

/// Zeros of `D_k`: the signed digit points, three copies of `-Q_{k+1}` and `-Q_k`.
fn level_divisor<C: CurveAffine>(points: &[C], digits: &[Vec<i8>], levels: &[C], k: usize) -> Vec<C> {
    let mut divisor: Vec<C> = points
        .iter()
        .zip(digits.iter())
        .filter_map(|(p, d)| match d[k] {
            1 => Some(*p),
            -1 => Some(-*p),
            _ => None,
        })
        .filter(|p| !bool::from(p.is_identity()))
        .collect();
    let next = -levels[k + 1];
    if !bool::from(next.is_identity()) {
        divisor.extend([next, next, next]);
    }
    let current = -levels[k];
    if !bool::from(current.is_identity()) {
        divisor.push(current);
    }
    divisor
}

fn level_dlog<C: CurveAffine>(
    points: &[C],
    digits: &[Vec<i8>],
    levels: &[C],
    k: usize,
    eq: &CurveEquation<C::Base>,
) -> Result<RationalFunction<C::Base>> {
    let divisor = level_divisor(points, digits, levels, k);
    let f = construct_function(&divisor, eq)
        .ok_or_else(|| MsmError::VerificationFailed(format!("divisor of level {k} is not principal")))?;
    Ok(f.dlog(eq).unwrap_or_else(RationalFunction::zero))
}

#[cfg(not(target_arch = "wasm32"))]
fn level_dlogs<C: CurveAffine>(
    points: &[C],
    digits: &[Vec<i8>],
    levels: &[C],
    eq: &CurveEquation<C::Base>,
    parallel: bool,
) -> Result<Vec<RationalFunction<C::Base>>> {
    use rayon::prelude::*;

    if parallel {
        (0..N_DIGITS)
            .into_par_iter()
            .map(|k| level_dlog(points, digits, levels, k, eq))
            .collect()
    } else {
        (0..N_DIGITS).map(|k| level_dlog(points, digits, levels, k, eq)).collect()
    }
}

#[cfg(target_arch = "wasm32")]
fn level_dlogs<C: CurveAffine>(
    points: &[C],
    digits: &[Vec<i8>],
    levels: &[C],
    eq: &CurveEquation<C::Base>,
    _parallel: bool,
) -> Result<Vec<RationalFunction<C::Base>>> {
    (0..N_DIGITS).map(|k| level_dlog(points, digits, levels, k, eq)).collect()
}

/// Pairwise sum, so both operands of each addition carry similar degrees.
fn sum_pairwise<F: Field>(mut terms: Vec<RationalFunction<F>>) -> RationalFunction<F> {
    while terms.len() > 1 {
        terms = terms
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => a.add(b),
                [a] => a.clone(),
                _ => RationalFunction::zero(),
            })
            .collect();
    }
    terms.pop().unwrap_or_else(RationalFunction::zero)
}

#[cfg(not(target_arch = "wasm32"))]
fn weighted_sum<F: Field>(dlogs: &[RationalFunction<F>], weights: &[F], parallel: bool) -> RationalFunction<F> {
    use rayon::prelude::*;

    if parallel {
        dlogs
            .par_iter()
            .zip(weights.par_iter())
            .map(|(d, w)| d.scale(w))
            .reduce(RationalFunction::zero, |acc, d| acc.add(&d))
    } else {
        sum_pairwise(dlogs.iter().zip(weights.iter()).map(|(d, w)| d.scale(w)).collect())
    }
}

#[cfg(target_arch = "wasm32")]
fn weighted_sum<F: Field>(dlogs: &[RationalFunction<F>], weights: &[F], _parallel: bool) -> RationalFunction<F> {
    sum_pairwise(dlogs.iter().zip(weights.iter()).map(|(d, w)| d.scale(w)).collect())
}

/// Builds the ECIP hint for `Σ scalars_i·points_i`.
///
/// `weights[k]` is `(-3)^k` in the base field. Every scalar must fit in
/// [`N_DIGITS`] balanced base -3 digits.
pub fn zk_ecip_hint<C: CurveAffine>(
    points: &[C],
    scalars: &[BigUint],
    weights: &[C::Base],
    eq: &CurveEquation<C::Base>,
    parallel: bool,
) -> Result<EcipHint<C>> {
    if points.len() != scalars.len() {
        return Err(MsmError::ShapeMismatch {
            points: points.len(),
            scalars: scalars.len(),
        });
    }
    let digits = scalars
        .iter()
        .map(|s| {
            neg3_digits(s).ok_or_else(|| MsmError::InvalidEncoding(format!("scalar {s} exceeds {N_DIGITS} digits")))
        })
        .collect::<Result<Vec<_>>>()?;

    let levels = accumulation_levels(points, &digits);
    let dlogs = level_dlogs(points, &digits, &levels, eq, parallel)?;
    let sum_dlog = weighted_sum(&dlogs, weights, parallel);

    Ok(EcipHint { q: levels[0], sum_dlog })
}
