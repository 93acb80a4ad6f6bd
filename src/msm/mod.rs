pub mod pippenger;

use halo2curves::CurveAffine;

/// Picks the parallel path once there are at least `parallel_threshold` terms.
pub fn compute_msm<C: CurveAffine>(points: &[C], scalars: &[C::Scalar], parallel_threshold: usize) -> C::Curve {
    if points.len() >= parallel_threshold {
        log::trace!("parallel msm over {} terms", points.len());
        pippenger::msm_parallel(points, scalars)
    } else {
        pippenger::msm(points, scalars)
    }
}
