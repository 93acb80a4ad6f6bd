//! Functions with a prescribed principal divisor.

use ff::Field;
use group::{Curve, Group};
use halo2curves::CurveAffine;

use crate::algebra::{CurveEquation, CurveFunction, Polynomial};
use crate::curves::point::affine_xy;

/// Running partial product: `num / den` has divisor `Σ[points] - [sum] - (k-1)[O]`.
struct Partial<C: CurveAffine> {
    sum: C::Curve,
    num: CurveFunction<C::Base>,
    den: Polynomial<C::Base>,
}

/// Chord through `a` and `b`, the tangent when they coincide. `None` when the
/// line is vertical.
pub fn chord<F: Field>(a: (F, F), b: (F, F), eq: &CurveEquation<F>) -> Option<(F, F)> {
    let (xa, ya) = a;
    let (xb, yb) = b;
    let lambda = if xa == xb {
        if ya != yb || ya.is_zero_vartime() {
            return None;
        }
        let slope = Option::<F>::from(ya.double().invert())?;
        eq.rhs_derivative().evaluate(&xa) * slope
    } else {
        (yb - ya) * Option::<F>::from((xb - xa).invert())?
    };
    Some((lambda, ya - lambda * xa))
}

fn merge<C: CurveAffine>(lhs: Partial<C>, rhs: Partial<C>, eq: &CurveEquation<C::Base>) -> Partial<C> {
    let sum = lhs.sum + rhs.sum;
    let mut num = lhs.num.mul(&rhs.num, eq);
    let mut den = &lhs.den * &rhs.den;

    if let (Some(a), Some(b)) = (affine_xy(&lhs.sum.to_affine()), affine_xy(&rhs.sum.to_affine())) {
        match chord(a, b, eq) {
            Some((lambda, mu)) => {
                num = num.mul(&CurveFunction::line(lambda, mu), eq);
                if let Some((xs, _)) = affine_xy(&sum.to_affine()) {
                    den = &den * &Polynomial::linear_root(xs);
                }
            }
            None => num = num.mul(&CurveFunction::vertical(a.0), eq),
        }
    }
    Partial { sum, num, den }
}

/// The polynomial function `a(x) + y·b(x)` whose zeros are exactly `points`
/// (with multiplicity) and whose only pole is at the identity.
///
/// Returns `None` if the points do not sum to the identity.
pub fn construct_function<C: CurveAffine>(points: &[C], eq: &CurveEquation<C::Base>) -> Option<CurveFunction<C::Base>> {
    let mut items: Vec<Partial<C>> = points
        .iter()
        .filter(|p| !bool::from(p.is_identity()))
        .map(|p| Partial {
            sum: p.to_curve(),
            num: CurveFunction::one(),
            den: Polynomial::one(),
        })
        .collect();

    if items.is_empty() {
        return Some(CurveFunction::one());
    }

    while items.len() > 1 {
        let mut next = Vec::with_capacity(items.len() / 2 + 1);
        let mut iter = items.into_iter();
        while let Some(lhs) = iter.next() {
            match iter.next() {
                Some(rhs) => next.push(merge(lhs, rhs, eq)),
                None => next.push(lhs),
            }
        }
        items = next;
    }

    let last = items.pop()?;
    if !bool::from(last.sum.is_identity()) {
        return None;
    }
    last.num.exact_div(&last.den)
}
