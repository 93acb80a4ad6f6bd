pub mod algebra;
pub mod calldata;
pub mod curves;
pub mod ecip;
pub mod error;
pub mod msm;
pub mod transcript;
pub mod utils;
pub mod wasm;

use ff::PrimeField;
use group::{Curve, Group};
use rand::thread_rng;

use halo2curves::{msm::msm_best, CurveAffine};

pub use calldata::verify::verify;
pub use calldata::{build, build_with_options, msm_calldata_builder, CalldataOptions, FunctionFelt, MsmCalldata, MsmHint};
pub use curves::point::G1Point;
pub use curves::registry::{init, is_initialized};
pub use curves::{CurveId, MsmCurve};
pub use error::{MsmError, Result};

/// Sample random scalars
pub fn sample_scalars<F: PrimeField>(n: usize) -> Vec<F> {
    let mut rng = thread_rng();
    (0..n).map(|_| F::random(&mut rng)).collect::<Vec<_>>()
}

/// Sample random affine points
pub fn sample_points<C: CurveAffine>(n: usize) -> Vec<C> {
    let mut rng = thread_rng();
    (0..n)
        .map(|_| C::Curve::random(&mut rng).to_affine())
        .collect::<Vec<_>>()
}

/// Reference MSM from halo2curves
pub fn cpu_msm<C: CurveAffine>(g: &[C], v: &[C::Scalar]) -> C::Curve {
    msm_best(v, g)
}

/// Points as the flat `[x0, y0, x1, y1, ...]` coordinate list taken by
/// [`msm_calldata_builder`].
pub fn points_to_values<C: CurveAffine>(g: &[C]) -> Vec<num_bigint::BigUint> {
    g.iter()
        .flat_map(|affine| {
            let p = G1Point::from_affine(affine);
            [p.x, p.y]
        })
        .collect::<Vec<_>>()
}
