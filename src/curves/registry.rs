use ff::{Field, PrimeField};
use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::OnceCell;

use super::point::{affine_xy, is_on_curve};
use super::{with_curve, CurveId, MsmCurve};
use crate::ecip::N_DIGITS;
use crate::error::{MsmError, Result};
use crate::utils::field::{biguint_to_field, field_to_biguint, modulus};

static REGISTRY: OnceCell<Registry> = OnceCell::new();

/// Constants for one curve, checked once at [`init`].
#[derive(Clone, Debug)]
pub struct CurveParams {
    pub id: CurveId,
    /// Base field modulus.
    pub p: BigUint,
    /// Prime subgroup order.
    pub r: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub generator: (BigUint, BigUint),
    pub prime_order: bool,
    /// `(-3)^k mod p` for every digit position.
    pub neg3_powers: Vec<BigUint>,
}

#[derive(Debug)]
pub struct Registry {
    curves: Vec<CurveParams>,
}

impl Registry {
    fn load() -> Result<Self> {
        let curves = CurveId::ALL
            .iter()
            .map(|id| with_curve!(*id, C => load_params::<C>()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { curves })
    }

    pub fn params(&self, id: CurveId) -> &CurveParams {
        &self.curves[id.index()]
    }
}

fn init_error(id: CurveId, what: &str) -> MsmError {
    MsmError::InitializationError(format!("{id}: {what}"))
}

fn load_params<C: MsmCurve>() -> Result<CurveParams> {
    let id = C::ID;
    let p = modulus::<C::Base>();
    let r = modulus::<C::Scalar>();
    if p.is_zero() || r.is_zero() {
        return Err(init_error(id, "unparsable modulus"));
    }

    // Field elements must round-trip through their canonical integer value.
    let sample = C::Base::from(0x1234_5678_9abc_def0u64).square();
    let sample_int = field_to_biguint(&sample);
    if sample_int >= p || biguint_to_field::<C::Base>(&sample_int) != Some(sample) {
        return Err(init_error(id, "base field encoding round-trip failed"));
    }
    if field_to_biguint(&C::Scalar::from(2u64)) != BigUint::from(2u32) {
        return Err(init_error(id, "scalar field encoding is not little-endian"));
    }

    let (gx, gy) = affine_xy(&C::generator()).ok_or_else(|| init_error(id, "generator is the identity"))?;
    if !is_on_curve::<C>(&gx, &gy) {
        return Err(init_error(id, "generator is not on the curve"));
    }

    let minus_three = -C::Base::from(3u64);
    let mut power = C::Base::ONE;
    let mut neg3_powers = Vec::with_capacity(N_DIGITS);
    for _ in 0..N_DIGITS {
        neg3_powers.push(field_to_biguint(&power));
        power *= minus_three;
    }

    log::debug!("loaded curve parameters for {id}");
    Ok(CurveParams {
        id,
        p,
        r,
        a: field_to_biguint(&C::a()),
        b: field_to_biguint(&C::b()),
        generator: (field_to_biguint(&gx), field_to_biguint(&gy)),
        prime_order: C::PRIME_ORDER,
        neg3_powers,
    })
}

/// Loads and checks the constant tables. Idempotent; concurrent callers block
/// until the first one finishes.
pub fn init() -> Result<()> {
    REGISTRY.get_or_try_init(Registry::load).map(|_| {
        log::trace!("curve registry ready");
    })
}

pub fn is_initialized() -> bool {
    REGISTRY.get().is_some()
}

/// The initialized registry, or [`MsmError::NotInitialized`].
pub fn registry() -> Result<&'static Registry> {
    REGISTRY.get().ok_or(MsmError::NotInitialized)
}

/// Shorthand for `registry()?.params(id)`.
pub fn params(id: CurveId) -> Result<&'static CurveParams> {
    Ok(registry()?.params(id))
}

/// Field element form of the `(-3)^k` table.
pub fn neg3_weights<F: PrimeField>(params: &CurveParams) -> Vec<F> {
    params
        .neg3_powers
        .iter()
        .map(|w| biguint_to_field::<F>(w).unwrap_or(F::ZERO))
        .collect()
}
