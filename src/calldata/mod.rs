//! MSM calldata: the claimed result plus everything a verifier needs to check it.

pub mod felts;
pub mod verify;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ff::PrimeField;
use group::Curve;
use halo2curves::CurveAffine;
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::algebra::{CurveEquation, Polynomial, RationalFunction};
use crate::curves::point::{mul_biguint, G1Point};
use crate::curves::registry::{neg3_weights, params, registry, CurveParams};
use crate::curves::{with_curve, CurveId, MsmCurve};
use crate::ecip::{zk_ecip_hint, PositionWeights};
use crate::error::{MsmError, Result};
use crate::msm::compute_msm;
use crate::utils::bigint::split_u256;
use crate::utils::field::{biguint_to_field, field_to_biguint, reduce_to_field};

/// Knobs for [`build_with_options`] and the flat felt encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalldataOptions {
    /// Emit the position weights of every scalar half.
    pub include_digits_decomposition: bool,
    /// Emit the input points and scalars.
    pub include_points_and_scalars: bool,
    /// Prefix the felts with their count.
    pub serialize_as_pure_felt252_array: bool,
    /// Term count from which MSMs and hints run on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for CalldataOptions {
    fn default() -> Self {
        Self {
            include_digits_decomposition: true,
            include_points_and_scalars: true,
            serialize_as_pure_felt252_array: false,
            parallel_threshold: 256,
        }
    }
}

impl CalldataOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// `A(x) + y·B(x)` as coefficient vectors, little-endian by degree.
///
/// Numerators are trimmed, denominators monic and coprime to their numerator.
/// The zero function is `a_num = b_num = []`, `a_den = b_den = [1]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFelt {
    #[serde(with = "crate::utils::tagged::vec")]
    pub a_num: Vec<BigUint>,
    #[serde(with = "crate::utils::tagged::vec")]
    pub a_den: Vec<BigUint>,
    #[serde(with = "crate::utils::tagged::vec")]
    pub b_num: Vec<BigUint>,
    #[serde(with = "crate::utils::tagged::vec")]
    pub b_den: Vec<BigUint>,
}

impl Default for FunctionFelt {
    fn default() -> Self {
        Self {
            a_num: vec![],
            a_den: vec![BigUint::one()],
            b_num: vec![],
            b_den: vec![BigUint::one()],
        }
    }
}

fn poly_to_ints<F: PrimeField>(p: &Polynomial<F>) -> Vec<BigUint> {
    p.coefficients().iter().map(field_to_biguint).collect()
}

fn ints_to_poly<F: PrimeField>(coeffs: &[BigUint], what: &str) -> Result<Polynomial<F>> {
    coeffs
        .iter()
        .map(|c| {
            biguint_to_field::<F>(c)
                .ok_or_else(|| MsmError::InvalidEncoding(format!("{what} coefficient {c} is not a field element")))
        })
        .collect::<Result<Vec<_>>>()
        .map(Polynomial::new)
}

impl FunctionFelt {
    pub fn from_rational<F: PrimeField>(f: &RationalFunction<F>) -> Self {
        Self {
            a_num: poly_to_ints(&f.a_num),
            a_den: poly_to_ints(&f.a_den),
            b_num: poly_to_ints(&f.b_num),
            b_den: poly_to_ints(&f.b_den),
        }
    }

    /// Decodes the coefficients as given, without re-reducing.
    pub fn to_rational<F: PrimeField>(&self) -> Result<RationalFunction<F>> {
        let a_den = ints_to_poly(&self.a_den, "a_den")?;
        let b_den = ints_to_poly(&self.b_den, "b_den")?;
        if a_den.is_zero() || b_den.is_zero() {
            return Err(MsmError::InvalidEncoding("zero denominator in function".to_string()));
        }
        Ok(RationalFunction {
            a_num: ints_to_poly(&self.a_num, "a_num")?,
            a_den,
            b_num: ints_to_poly(&self.b_num, "b_num")?,
            b_den,
        })
    }

    /// The four coefficient arrays in wire order.
    pub fn arrays(&self) -> [&[BigUint]; 4] {
        [&self.a_num, &self.a_den, &self.b_num, &self.b_den]
    }
}

/// Position weights of the two 128-bit halves of one scalar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarWeights {
    pub low: PositionWeights,
    pub high: PositionWeights,
}

/// The three ECIP relations: `Σ low_i·P_i = q_low`, `Σ high_i·P_i = q_high`
/// and `2^128·q_high = q_high_shifted`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsmHint {
    pub q_low: G1Point,
    pub q_high: G1Point,
    pub q_high_shifted: G1Point,
    pub sum_dlog_low: FunctionFelt,
    pub sum_dlog_high: FunctionFelt,
    pub sum_dlog_high_shifted: FunctionFelt,
}

impl MsmHint {
    pub fn points(&self) -> [&G1Point; 3] {
        [&self.q_low, &self.q_high, &self.q_high_shifted]
    }

    pub fn functions(&self) -> [&FunctionFelt; 3] {
        [&self.sum_dlog_low, &self.sum_dlog_high, &self.sum_dlog_high_shifted]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsmCalldata {
    pub curve: CurveId,
    pub points: Vec<G1Point>,
    /// Reduced mod the group order.
    #[serde(with = "crate::utils::tagged::vec")]
    pub scalars: Vec<BigUint>,
    pub weights: Vec<ScalarWeights>,
    pub hint: MsmHint,
    pub result: G1Point,
}

impl MsmCalldata {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(&STANDARD.decode(s)?)
    }
}

/// `2^128`, the shift between scalar halves.
pub fn half_shift() -> BigUint {
    BigUint::one() << 128usize
}

#[cfg(not(target_arch = "wasm32"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(target_arch = "wasm32")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

/// Builds calldata for `Σ scalars_i·points_i` with default options.
pub fn build(points: &[G1Point], scalars: &[BigUint], curve: CurveId) -> Result<MsmCalldata> {
    build_with_options(points, scalars, curve, &CalldataOptions::default())
}

pub fn build_with_options(
    points: &[G1Point],
    scalars: &[BigUint],
    curve: CurveId,
    options: &CalldataOptions,
) -> Result<MsmCalldata> {
    let params = params(curve)?;
    if points.len() != scalars.len() {
        return Err(MsmError::ShapeMismatch {
            points: points.len(),
            scalars: scalars.len(),
        });
    }
    log::debug!("building {curve} msm calldata for {} terms", points.len());
    with_curve!(curve, C => build_for::<C>(points, scalars, params, options))
}

/// Decodes every point, naming the offending index on failure.
pub(crate) fn decode_points<C: MsmCurve>(points: &[G1Point], params: &CurveParams) -> Result<Vec<C>> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            p.to_affine::<C>(params).map_err(|e| match e {
                MsmError::InvalidEncoding(msg) => MsmError::InvalidEncoding(format!("point {i}: {msg}")),
                other => other,
            })
        })
        .collect()
}

fn build_for<C: MsmCurve>(
    points: &[G1Point],
    scalars: &[BigUint],
    params: &CurveParams,
    options: &CalldataOptions,
) -> Result<MsmCalldata> {
    let decoded = decode_points::<C>(points, params)?;
    let reduced: Vec<BigUint> = scalars.iter().map(|s| s % &params.r).collect();
    let (lows, highs): (Vec<BigUint>, Vec<BigUint>) = reduced.iter().map(split_u256).unzip();

    let threshold = options.parallel_threshold;
    let parallel = decoded.len() >= threshold;
    let eq = CurveEquation::new(C::a(), C::b());
    let neg3 = neg3_weights::<C::Base>(params);
    let shift = half_shift();

    let low_scalars: Vec<C::Scalar> = lows.iter().map(|s| reduce_to_field(s, &params.r)).collect();
    let high_scalars: Vec<C::Scalar> = highs.iter().map(|s| reduce_to_field(s, &params.r)).collect();
    let (q_low, q_high) = join(
        || compute_msm(&decoded, &low_scalars, threshold),
        || compute_msm(&decoded, &high_scalars, threshold),
    );
    let q_high_shifted = mul_biguint::<C>(&q_high, &shift);
    let result = q_low + q_high_shifted;

    let (hint_low, hint_high) = join(
        || zk_ecip_hint(&decoded, &lows, &neg3, &eq, parallel),
        || zk_ecip_hint(&decoded, &highs, &neg3, &eq, parallel),
    );
    let (hint_low, hint_high) = (hint_low?, hint_high?);
    let q_high_affine = q_high.to_affine();
    let hint_shifted = zk_ecip_hint(&[q_high_affine], &[shift], &neg3, &eq, parallel)?;

    for (name, hint_q, msm_q) in [
        ("low", hint_low.q, q_low),
        ("high", hint_high.q, q_high),
        ("high_shifted", hint_shifted.q, q_high_shifted),
    ] {
        if hint_q != msm_q.to_affine() {
            return Err(MsmError::VerificationFailed(format!(
                "{name} hint disagrees with the msm"
            )));
        }
    }

    let weights = reduced.iter().map(felts::weights_for_scalar).collect::<Result<Vec<_>>>()?;

    Ok(MsmCalldata {
        curve: C::ID,
        points: decoded.iter().map(G1Point::from_affine).collect(),
        scalars: reduced,
        weights,
        hint: MsmHint {
            q_low: G1Point::from_curve::<C>(&q_low),
            q_high: G1Point::from_affine(&q_high_affine),
            q_high_shifted: G1Point::from_curve::<C>(&q_high_shifted),
            sum_dlog_low: FunctionFelt::from_rational(&hint_low.sum_dlog),
            sum_dlog_high: FunctionFelt::from_rational(&hint_high.sum_dlog),
            sum_dlog_high_shifted: FunctionFelt::from_rational(&hint_shifted.sum_dlog),
        },
        result: G1Point::from_curve::<C>(&result),
    })
}

/// Flat entry point: `values = [x0, y0, x1, y1, ...]`, returns the felts.
pub fn msm_calldata_builder(
    values: &[BigUint],
    scalars: &[BigUint],
    curve_id: usize,
    options: &CalldataOptions,
) -> Result<Vec<BigUint>> {
    registry()?;
    let curve = CurveId::try_from(curve_id)?;
    if values.len() % 2 != 0 {
        return Err(MsmError::InvalidEncoding(format!(
            "odd number of point coordinates ({})",
            values.len()
        )));
    }
    if values.len() / 2 != scalars.len() {
        return Err(MsmError::ShapeMismatch {
            points: values.len() / 2,
            scalars: scalars.len(),
        });
    }
    let points = values
        .iter()
        .cloned()
        .tuples()
        .map(|(x, y)| G1Point::new(x, y))
        .collect_vec();
    let calldata = build_with_options(&points, scalars, curve, options)?;
    Ok(calldata.to_felts(options))
}
