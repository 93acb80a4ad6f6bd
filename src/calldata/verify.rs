use ff::PrimeField;
use group::prime::PrimeCurveAffine;
use group::Curve;
use itertools::Itertools;
use num_bigint::BigInt;

use super::{decode_points, half_shift, MsmCalldata};
use crate::algebra::CurveEquation;
use crate::curves::point::G1Point;
use crate::curves::registry::{params, CurveParams};
use crate::curves::{with_curve, CurveId, MsmCurve};
use crate::ecip::{PositionWeights, RandomLine, Relation};
use crate::error::{MsmError, Result};
use crate::transcript::Transcript;
use crate::utils::bigint::split_u256;
use crate::utils::field::{bigint_to_field, reduce_to_field};

/// Lines tried before giving up. Each degenerate draw has negligible probability.
const MAX_LINE_ATTEMPTS: usize = 16;

/// Absorbs everything the hint commits to, in wire order.
pub fn transcript_for(calldata: &MsmCalldata) -> Transcript {
    let mut t = Transcript::new(calldata.curve);
    t.append_u64(calldata.points.len() as u64);
    for p in &calldata.points {
        t.append_point(p);
    }
    for s in &calldata.scalars {
        t.append_biguint(s);
    }
    for q in calldata.hint.points() {
        t.append_point(q);
    }
    for f in calldata.hint.functions() {
        for coeffs in f.arrays() {
            t.append_biguints(coeffs);
        }
    }
    t
}

/// `q_low + q_high_shifted` on `curve`.
pub fn combine_halves(curve: CurveId, q_low: &G1Point, q_high_shifted: &G1Point) -> Result<G1Point> {
    let params = params(curve)?;
    with_curve!(curve, C => {
        let low = q_low.to_affine::<C>(params)?;
        let shifted = q_high_shifted.to_affine::<C>(params)?;
        Ok(G1Point::from_curve::<C>(&(low + shifted)))
    })
}

/// Checks `calldata` without recomputing the MSM: the result against the hint
/// points, the position weights against the scalars, and the three ECIP
/// relations on a line drawn from the transcript.
pub fn verify(calldata: &MsmCalldata) -> Result<()> {
    let params = params(calldata.curve)?;
    with_curve!(calldata.curve, C => verify_for::<C>(calldata, params))
}

fn field_weights<F: PrimeField>(w: &PositionWeights, p: &num_bigint::BigUint) -> (F, F) {
    (bigint_to_field(&w.ep, p), bigint_to_field(&w.en, p))
}

fn verify_for<C: MsmCurve>(calldata: &MsmCalldata, params: &CurveParams) -> Result<()> {
    let n = calldata.points.len();
    if calldata.scalars.len() != n {
        return Err(MsmError::ShapeMismatch {
            points: n,
            scalars: calldata.scalars.len(),
        });
    }
    if calldata.weights.len() != n {
        return Err(MsmError::InvalidEncoding(format!(
            "{} weight entries for {n} scalars",
            calldata.weights.len()
        )));
    }

    let points = decode_points::<C>(&calldata.points, params)?;
    let [q_low, q_high, q_high_shifted] = calldata.hint.points().map(|q| q.to_affine::<C>(params));
    let (q_low, q_high, q_high_shifted) = (q_low?, q_high?, q_high_shifted?);
    let result = calldata.result.to_affine::<C>(params)?;

    if (q_low + q_high_shifted).to_affine() != result {
        return Err(MsmError::VerificationFailed(
            "result is not q_low + q_high_shifted".to_string(),
        ));
    }

    for (i, (s, w)) in calldata.scalars.iter().zip_eq(calldata.weights.iter()).enumerate() {
        if s >= &params.r {
            return Err(MsmError::InvalidEncoding(format!("scalar {i} is not reduced")));
        }
        let (low, high) = split_u256(s);
        if w.low.scalar() != BigInt::from(low) || w.high.scalar() != BigInt::from(high) {
            return Err(MsmError::VerificationFailed(format!(
                "position weights of scalar {i} do not sum to it"
            )));
        }
    }

    let p = &params.p;
    let low_weights: Vec<(C::Base, C::Base)> = calldata.weights.iter().map(|w| field_weights(&w.low, p)).collect();
    let high_weights: Vec<(C::Base, C::Base)> = calldata.weights.iter().map(|w| field_weights(&w.high, p)).collect();
    let shift_weights = PositionWeights::for_scalar(&half_shift())
        .map(|w| vec![field_weights::<C::Base>(&w, p)])
        .unwrap_or_default();

    let hint = &calldata.hint;
    let sum_low = hint.sum_dlog_low.to_rational::<C::Base>()?;
    let sum_high = hint.sum_dlog_high.to_rational::<C::Base>()?;
    let sum_shifted = hint.sum_dlog_high_shifted.to_rational::<C::Base>()?;
    let high_base = [q_high];

    let relations = [
        (
            "low",
            Relation {
                points: &points,
                weights: &low_weights,
                q: &q_low,
                sum_dlog: &sum_low,
            },
        ),
        (
            "high",
            Relation {
                points: &points,
                weights: &high_weights,
                q: &q_high,
                sum_dlog: &sum_high,
            },
        ),
        (
            "high_shifted",
            Relation {
                points: &high_base,
                weights: &shift_weights,
                q: &q_high_shifted,
                sum_dlog: &sum_shifted,
            },
        ),
    ];

    let eq = CurveEquation::new(C::a(), C::b());
    let mut transcript = transcript_for(calldata);
    for attempt in 0..MAX_LINE_ATTEMPTS {
        let c0: C::Scalar = reduce_to_field(&transcript.challenge(&params.r), &params.r);
        let c1: C::Scalar = reduce_to_field(&transcript.challenge(&params.r), &params.r);
        let a0 = (C::generator() * c0).to_affine();
        let a1 = (C::generator() * c1).to_affine();
        let Some(line) = RandomLine::through(&a0, &a1, &eq) else {
            log::debug!("line {attempt} is degenerate, drawing another");
            continue;
        };

        let outcomes: Option<Vec<(&str, bool)>> = relations
            .iter()
            .map(|(name, relation)| relation.check(&line, &eq).map(|ok| (*name, ok)))
            .collect();
        let Some(outcomes) = outcomes else {
            log::debug!("line {attempt} meets a pole, drawing another");
            continue;
        };
        return match outcomes.iter().find(|(_, ok)| !ok) {
            Some((name, _)) => Err(MsmError::VerificationFailed(format!(
                "{name} relation does not hold"
            ))),
            None => Ok(()),
        };
    }
    Err(MsmError::VerificationFailed(format!(
        "no usable line after {MAX_LINE_ATTEMPTS} attempts"
    )))
}
