//! Flat felt encoding of [`MsmCalldata`].
//!
//! Field elements are u384 (four 96-bit limbs, least significant first),
//! scalars are u256 (two 128-bit halves, low first), arrays are length
//! prefixed. Signed position weights are `|ep|, |en|, sign(ep), sign(en)` with
//! sign `1` for negative.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use super::{CalldataOptions, FunctionFelt, MsmCalldata, MsmHint, ScalarWeights};
use crate::curves::point::G1Point;
use crate::curves::CurveId;
use crate::ecip::PositionWeights;
use crate::error::{MsmError, Result};
use crate::utils::bigint::{biguint_to_u384_limbs, join_u256, split_u256, u384_limbs_to_biguint, N_LIMBS};

fn sign_magnitude(n: &BigInt) -> (BigUint, BigUint) {
    let sign = if n.sign() == Sign::Minus { 1u32 } else { 0 };
    (n.magnitude().clone(), BigUint::from(sign))
}

#[derive(Default)]
struct FeltWriter {
    felts: Vec<BigUint>,
}

impl FeltWriter {
    fn push_usize(&mut self, n: usize) {
        self.felts.push(BigUint::from(n));
    }

    fn push_u384(&mut self, v: &BigUint) {
        self.felts.extend(biguint_to_u384_limbs(v));
    }

    fn push_point(&mut self, p: &G1Point) {
        self.push_u384(&p.x);
        self.push_u384(&p.y);
    }

    fn push_array(&mut self, coeffs: &[BigUint]) {
        self.push_usize(coeffs.len());
        for c in coeffs {
            self.push_u384(c);
        }
    }

    fn push_function(&mut self, f: &FunctionFelt) {
        for array in f.arrays() {
            self.push_array(array);
        }
    }

    fn push_weights(&mut self, w: &PositionWeights) {
        let (ep, ep_sign) = sign_magnitude(&w.ep);
        let (en, en_sign) = sign_magnitude(&w.en);
        self.felts.extend([ep, en, ep_sign, en_sign]);
    }

    fn push_u256(&mut self, v: &BigUint) {
        let (low, high) = split_u256(v);
        self.felts.extend([low, high]);
    }
}

struct FeltReader<'a> {
    felts: &'a [BigUint],
    pos: usize,
}

impl<'a> FeltReader<'a> {
    fn next(&mut self) -> Result<&'a BigUint> {
        let felt = self
            .felts
            .get(self.pos)
            .ok_or_else(|| MsmError::InvalidEncoding(format!("calldata truncated at felt {}", self.pos)))?;
        self.pos += 1;
        Ok(felt)
    }

    fn next_usize(&mut self) -> Result<usize> {
        let pos = self.pos;
        self.next()?
            .to_usize()
            .ok_or_else(|| MsmError::InvalidEncoding(format!("felt {pos} is not a machine integer")))
    }

    /// A length prefix; no length can exceed the felts that are left.
    fn next_len(&mut self) -> Result<usize> {
        let pos = self.pos;
        let len = self.next_usize()?;
        if len > self.felts.len() - self.pos {
            return Err(MsmError::InvalidEncoding(format!("length {len} at felt {pos} overruns the calldata")));
        }
        Ok(len)
    }

    fn next_u384(&mut self) -> Result<BigUint> {
        let pos = self.pos;
        let limbs = (0..N_LIMBS).map(|_| self.next().cloned()).collect::<Result<Vec<_>>>()?;
        u384_limbs_to_biguint(&limbs).ok_or_else(|| MsmError::InvalidEncoding(format!("limb overflow at felt {pos}")))
    }

    fn next_point(&mut self) -> Result<G1Point> {
        Ok(G1Point::new(self.next_u384()?, self.next_u384()?))
    }

    fn next_array(&mut self) -> Result<Vec<BigUint>> {
        let len = self.next_len()?;
        (0..len).map(|_| self.next_u384()).collect()
    }

    fn next_function(&mut self) -> Result<FunctionFelt> {
        Ok(FunctionFelt {
            a_num: self.next_array()?,
            a_den: self.next_array()?,
            b_num: self.next_array()?,
            b_den: self.next_array()?,
        })
    }

    fn next_signed(&mut self, magnitude: &BigUint, sign: &BigUint) -> Result<BigInt> {
        match sign.to_u8() {
            Some(0) => Ok(BigInt::from(magnitude.clone())),
            Some(1) => Ok(-BigInt::from(magnitude.clone())),
            _ => Err(MsmError::InvalidEncoding(format!("bad sign flag {sign} at felt {}", self.pos))),
        }
    }

    fn next_weights(&mut self) -> Result<PositionWeights> {
        let ep = self.next()?;
        let en = self.next()?;
        let ep_sign = self.next()?;
        let en_sign = self.next()?;
        Ok(PositionWeights {
            ep: self.next_signed(ep, ep_sign)?,
            en: self.next_signed(en, en_sign)?,
        })
    }

    fn next_u256(&mut self) -> Result<BigUint> {
        let low = self.next()?;
        let high = self.next()?;
        if low.bits() > 128 || high.bits() > 128 {
            return Err(MsmError::InvalidEncoding(format!("u256 half overflow at felt {}", self.pos)));
        }
        Ok(join_u256(low, high))
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.felts.len() {
            return Err(MsmError::InvalidEncoding(format!(
                "{} trailing felts",
                self.felts.len() - self.pos
            )));
        }
        Ok(())
    }
}

impl MsmCalldata {
    /// Flat felts in wire order: `[len]`, hint points, hint functions,
    /// `[n, weights]`, `[n, points, n, scalars]`, curve id.
    pub fn to_felts(&self, options: &CalldataOptions) -> Vec<BigUint> {
        let mut w = FeltWriter::default();
        for p in self.hint.points() {
            w.push_point(p);
        }
        for f in self.hint.functions() {
            w.push_function(f);
        }
        if options.include_digits_decomposition {
            w.push_usize(self.weights.len());
            for sw in &self.weights {
                w.push_weights(&sw.low);
                w.push_weights(&sw.high);
            }
        }
        if options.include_points_and_scalars {
            w.push_usize(self.points.len());
            for p in &self.points {
                w.push_point(p);
            }
            w.push_usize(self.scalars.len());
            for s in &self.scalars {
                w.push_u256(s);
            }
        }
        w.push_usize(usize::from(self.curve));

        if options.serialize_as_pure_felt252_array {
            let mut felts = Vec::with_capacity(w.felts.len() + 1);
            felts.push(BigUint::from(w.felts.len()));
            felts.append(&mut w.felts);
            felts
        } else {
            w.felts
        }
    }

    /// Parses [`MsmCalldata::to_felts`] output produced with the same options.
    ///
    /// Points and scalars must be present. Without the digit section the
    /// weights are recomputed from the scalars. `result` is
    /// `q_low + q_high_shifted` and needs an initialized registry.
    pub fn from_felts(felts: &[BigUint], options: &CalldataOptions) -> Result<Self> {
        if !options.include_points_and_scalars {
            return Err(MsmError::InvalidEncoding(
                "calldata without points and scalars cannot be decoded".to_string(),
            ));
        }
        let mut r = FeltReader { felts, pos: 0 };
        if options.serialize_as_pure_felt252_array {
            let len = r.next_usize()?;
            if len != felts.len() - 1 {
                return Err(MsmError::InvalidEncoding(format!(
                    "length prefix {len} does not match {} felts",
                    felts.len() - 1
                )));
            }
        }

        let q_low = r.next_point()?;
        let q_high = r.next_point()?;
        let q_high_shifted = r.next_point()?;
        let hint = MsmHint {
            q_low,
            q_high,
            q_high_shifted,
            sum_dlog_low: r.next_function()?,
            sum_dlog_high: r.next_function()?,
            sum_dlog_high_shifted: r.next_function()?,
        };

        let weights = if options.include_digits_decomposition {
            let n = r.next_len()?;
            (0..n)
                .map(|_| {
                    Ok(ScalarWeights {
                        low: r.next_weights()?,
                        high: r.next_weights()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![]
        };

        let n_points = r.next_len()?;
        let points = (0..n_points).map(|_| r.next_point()).collect::<Result<Vec<_>>>()?;
        let n_scalars = r.next_len()?;
        let scalars = (0..n_scalars).map(|_| r.next_u256()).collect::<Result<Vec<_>>>()?;
        let curve = CurveId::try_from(r.next_usize()?)?;
        r.finish()?;

        let weights = if options.include_digits_decomposition {
            weights
        } else {
            scalars.iter().map(weights_for_scalar).collect::<Result<Vec<_>>>()?
        };
        let result = super::verify::combine_halves(curve, &hint.q_low, &hint.q_high_shifted)?;

        Ok(Self {
            curve,
            points,
            scalars,
            weights,
            hint,
            result,
        })
    }
}

/// Position weights of both halves of `s`.
pub fn weights_for_scalar(s: &BigUint) -> Result<ScalarWeights> {
    let (low, high) = split_u256(s);
    match (PositionWeights::for_scalar(&low), PositionWeights::for_scalar(&high)) {
        (Some(low), Some(high)) => Ok(ScalarWeights { low, high }),
        _ => Err(MsmError::InvalidEncoding(format!("scalar {s} exceeds 256 bits"))),
    }
}

/// Felt count of the flat encoding for `calldata` under `options`.
pub fn felt_count(calldata: &MsmCalldata, options: &CalldataOptions) -> usize {
    let point = 2 * N_LIMBS;
    let function = |f: &FunctionFelt| f.arrays().iter().map(|a| 1 + N_LIMBS * a.len()).sum::<usize>();
    let n = calldata.points.len();
    let mut count = 3 * point + calldata.hint.functions().into_iter().map(function).sum::<usize>() + 1;
    if options.include_digits_decomposition {
        count += 1 + 8 * calldata.weights.len();
    }
    if options.include_points_and_scalars {
        count += 1 + point * n + 1 + 2 * calldata.scalars.len();
    }
    if options.serialize_as_pure_felt252_array {
        count += 1;
    }
    count
}
