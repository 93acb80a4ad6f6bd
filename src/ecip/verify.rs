//! Checks an ECIP hint at the points where a random line meets the curve.

use ff::Field;
use group::Curve;
use halo2curves::CurveAffine;

use super::divisor::chord;
use crate::algebra::{CurveEquation, RationalFunction};
use crate::curves::point::affine_xy;

/// The line `y = λ·x + μ` and its three intersections with the curve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomLine<F: Field> {
    pub lambda: F,
    pub mu: F,
    pub points: [(F, F); 3],
}

impl<F: Field> RandomLine<F> {
    /// Line through `a0` and `a1`. `None` if it is vertical, tangent, or one of
    /// the points is the identity.
    pub fn through<C: CurveAffine<Base = F>>(a0: &C, a1: &C, eq: &CurveEquation<F>) -> Option<Self> {
        let p0 = affine_xy(a0)?;
        let p1 = affine_xy(a1)?;
        if p0.0 == p1.0 {
            return None;
        }
        let (lambda, mu) = chord(p0, p1, eq)?;
        let p2 = affine_xy(&(-(*a0 + *a1)).to_affine())?;
        if p2.0 == p0.0 || p2.0 == p1.0 {
            return None;
        }
        Some(Self {
            lambda,
            mu,
            points: [p0, p1, p2],
        })
    }

    /// `y - λ·x - μ`
    pub fn eval(&self, x: &F, y: &F) -> F {
        *y - self.lambda * x - self.mu
    }
}

/// A relation `Q = Σ s_i·P_i` as seen by the verifier: the scalars enter only
/// through their position weights `(ep_i, en_i)` reduced into the base field.
pub struct Relation<'a, C: CurveAffine> {
    pub points: &'a [C],
    pub weights: &'a [(C::Base, C::Base)],
    pub q: &'a C,
    pub sum_dlog: &'a RationalFunction<C::Base>,
}

impl<C: CurveAffine> Relation<'_, C> {
    /// `Some(true)` when
    /// `Σ_j F(A_j)/(3x_j^2 + a - 2λ·y_j) == -(Σ_i [ep_i/ℓ(P_i) + en_i/ℓ(-P_i)] + 1/ℓ(-Q))`.
    ///
    /// `None` if a denominator vanishes on this line, which only happens for
    /// a negligible set of lines; the caller should draw another one.
    pub fn check(&self, line: &RandomLine<C::Base>, eq: &CurveEquation<C::Base>) -> Option<bool> {
        let dg = eq.rhs_derivative();
        let mut lhs = C::Base::ZERO;
        for (x, y) in &line.points {
            let value = self.sum_dlog.evaluate(x, y)?;
            let slope = dg.evaluate(x) - line.lambda * y.double();
            lhs += value * Option::<C::Base>::from(slope.invert())?;
        }

        let mut rhs = C::Base::ZERO;
        for (p, (ep, en)) in self.points.iter().zip(self.weights.iter()) {
            let Some((x, y)) = affine_xy(p) else {
                continue;
            };
            if !bool::from(ep.is_zero()) {
                rhs += *ep * Option::<C::Base>::from(line.eval(&x, &y).invert())?;
            }
            if !bool::from(en.is_zero()) {
                rhs += *en * Option::<C::Base>::from(line.eval(&x, &-y).invert())?;
            }
        }
        if let Some((x, y)) = affine_xy(self.q) {
            rhs += Option::<C::Base>::from(line.eval(&x, &-y).invert())?;
        }

        Some(lhs == -rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::registry::{init, neg3_weights, params};
    use crate::curves::CurveId;
    use crate::ecip::digits::PositionWeights;
    use crate::ecip::prover::zk_ecip_hint;
    use crate::utils::field::bigint_to_field;
    use group::prime::PrimeCurveAffine;
    use halo2curves::bn256::{Fq, Fr, G1Affine, G1};
    use num_bigint::BigUint;

    fn bn254() -> CurveEquation<Fq> {
        CurveEquation::new(G1Affine::a(), G1Affine::b())
    }

    fn line(c0: u64, c1: u64) -> RandomLine<Fq> {
        let a0 = (G1::generator() * Fr::from(c0)).to_affine();
        let a1 = (G1::generator() * Fr::from(c1)).to_affine();
        RandomLine::through(&a0, &a1, &bn254()).unwrap()
    }

    fn field_weights(scalars: &[BigUint]) -> Vec<(Fq, Fq)> {
        let p = &params(CurveId::Bn254).unwrap().p;
        scalars
            .iter()
            .map(|s| {
                let w = PositionWeights::for_scalar(s).unwrap();
                (bigint_to_field(&w.ep, p), bigint_to_field(&w.en, p))
            })
            .collect()
    }

    #[test]
    fn test_line_hits_curve() {
        let eq = bn254();
        let l = line(12345, 67890);
        for (x, y) in &l.points {
            assert!(eq.contains(x, y));
            assert_eq!(l.eval(x, y), Fq::ZERO);
        }
        let g = G1Affine::generator();
        assert!(RandomLine::through(&g, &g, &eq).is_none());
        assert!(RandomLine::through(&g, &-g, &eq).is_none());
    }

    #[test]
    fn test_honest_hint_passes() {
        init().unwrap();
        let eq = bn254();
        let weights = neg3_weights(params(CurveId::Bn254).unwrap());
        let points = crate::sample_points::<G1Affine>(3);
        let scalars = vec![
            BigUint::from(10u32),
            BigUint::from(987_654_321u64),
            (BigUint::from(1u32) << 128usize) - 1u32,
        ];
        let hint = zk_ecip_hint(&points, &scalars, &weights, &eq, false).unwrap();
        let w = field_weights(&scalars);
        let relation = Relation {
            points: &points,
            weights: &w,
            q: &hint.q,
            sum_dlog: &hint.sum_dlog,
        };
        assert_eq!(relation.check(&line(3, 1_000_001), &eq), Some(true));
        assert_eq!(relation.check(&line(77, 5), &eq), Some(true));
    }

    #[test]
    fn test_wrong_q_fails() {
        init().unwrap();
        let eq = bn254();
        let weights = neg3_weights(params(CurveId::Bn254).unwrap());
        let points = vec![G1Affine::generator()];
        let scalars = vec![BigUint::from(10u32)];
        let hint = zk_ecip_hint(&points, &scalars, &weights, &eq, false).unwrap();
        assert_eq!(hint.q, (G1::generator() * Fr::from(10u64)).to_affine());

        let w = field_weights(&scalars);
        let wrong_q = (G1::generator() * Fr::from(11u64)).to_affine();
        let relation = Relation {
            points: &points,
            weights: &w,
            q: &wrong_q,
            sum_dlog: &hint.sum_dlog,
        };
        assert_eq!(relation.check(&line(3, 1_000_001), &eq), Some(false));
    }

    #[test]
    fn test_wrong_weights_fail() {
        init().unwrap();
        let eq = bn254();
        let weights = neg3_weights(params(CurveId::Bn254).unwrap());
        let points = crate::sample_points::<G1Affine>(2);
        let scalars = vec![BigUint::from(5u32), BigUint::from(6u32)];
        let hint = zk_ecip_hint(&points, &scalars, &weights, &eq, false).unwrap();
        let mut w = field_weights(&scalars);
        w[1].0 += Fq::ONE;
        let relation = Relation {
            points: &points,
            weights: &w,
            q: &hint.q,
            sum_dlog: &hint.sum_dlog,
        };
        assert_eq!(relation.check(&line(41, 43), &eq), Some(false));
    }

    #[test]
    fn test_empty_relation() {
        let eq = bn254();
        let q = G1Affine::identity();
        let f = RationalFunction::zero();
        let relation = Relation::<G1Affine> {
            points: &[],
            weights: &[],
            q: &q,
            sum_dlog: &f,
        };
        assert_eq!(relation.check(&line(9, 10), &eq), Some(true));
    }

    #[test]
    fn test_relation_summing_to_identity() {
        init().unwrap();
        let eq = bn254();
        let weights = neg3_weights(params(CurveId::Bn254).unwrap());
        let g = G1Affine::generator();
        let points = vec![g, -g];
        let scalars = vec![BigUint::from(5u32), BigUint::from(5u32)];
        let hint = zk_ecip_hint(&points, &scalars, &weights, &eq, false).unwrap();
        assert!(bool::from(hint.q.is_identity()));

        let w = field_weights(&scalars);
        let relation = Relation {
            points: &points,
            weights: &w,
            q: &hint.q,
            sum_dlog: &hint.sum_dlog,
        };
        assert_eq!(relation.check(&line(77, 78), &eq), Some(true));
        assert!(RandomLine::through(&hint.q, &g, &eq).is_none());
    }
}
