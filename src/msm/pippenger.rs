//! CPU Pippenger with signed bucket indices.
//!
//! Scalars are cut into `c`-bit windows, every window digit is shifted into
//! `[-2^(c-1), 2^(c-1)]` with a carry into the next window, so each window only
//! needs `2^(c-1)` buckets. Windows are reduced with a running sum and combined
//! with Horner's rule.

use ff::PrimeField;
use group::Group;
use halo2curves::CurveAffine;

/// Window width for `n` terms.
pub fn window_size(n: usize) -> usize {
    if n < 32 {
        3
    } else {
        ((n as f64).ln().ceil() as usize).clamp(4, 16)
    }
}

/// Enough windows for `num_bits` plus the final carry.
pub fn num_windows(num_bits: usize, word_size: usize) -> usize {
    num_bits / word_size + 1
}

/// Little-endian `word_size`-bit words of a little-endian byte string.
pub fn to_words_le(bytes: &[u8], num_words: usize, word_size: usize) -> Vec<u32> {
    (0..num_words)
        .map(|w| {
            let mut word = 0u32;
            for bit in 0..word_size {
                let pos = w * word_size + bit;
                let byte = bytes.get(pos / 8).copied().unwrap_or(0);
                word |= (((byte >> (pos % 8)) & 1) as u32) << bit;
            }
            word
        })
        .collect()
}

/// Signed window digits, indexed `[window][scalar]`.
pub fn decompose_scalars_signed<F: PrimeField>(scalars: &[F], num_words: usize, word_size: usize) -> Vec<Vec<i32>> {
    let l = 1i32 << word_size;
    let half = l / 2;

    let per_scalar: Vec<Vec<i32>> = scalars
        .iter()
        .map(|scalar| {
            let repr = scalar.to_repr();
            let limbs = to_words_le(repr.as_ref(), num_words, word_size);
            let mut carry = 0;
            limbs
                .iter()
                .enumerate()
                .map(|(i, limb)| {
                    let v = *limb as i32 + carry;
                    // The top window has a free bit, so it absorbs the last carry unsigned.
                    if v >= half && i + 1 < num_words {
                        carry = 1;
                        v - l
                    } else {
                        carry = 0;
                        v
                    }
                })
                .collect()
        })
        .collect();

    (0..num_words)
        .map(|w| per_scalar.iter().map(|digits| digits[w]).collect())
        .collect()
}

/// Sums points into buckets by `|digit|`; `buckets[j]` collects digit `j + 1`.
pub fn bucket_accumulation<C: CurveAffine>(points: &[C::Curve], digits: &[i32], word_size: usize) -> Vec<C::Curve> {
    let mut buckets = vec![C::Curve::identity(); 1 << (word_size - 1)];
    for (point, digit) in points.iter().zip(digits.iter()) {
        match digit.signum() {
            1 => buckets[(*digit - 1) as usize] += point,
            -1 => buckets[(-*digit - 1) as usize] -= point,
            _ => {}
        }
    }
    buckets
}

/// `Σ (j + 1)·buckets[j]` with one running sum.
pub fn running_sum_bucket_reduction<C: CurveAffine>(buckets: &[C::Curve]) -> C::Curve {
    let mut m = C::Curve::identity();
    let mut g = C::Curve::identity();
    for b in buckets.iter().rev() {
        m += b;
        g += m;
    }
    g
}

/// Combines window sums, most significant last.
pub fn horner<C: CurveAffine>(window_sums: &[C::Curve], word_size: usize) -> C::Curve {
    window_sums.iter().rev().fold(C::Curve::identity(), |acc, w| {
        let mut acc = acc;
        for _ in 0..word_size {
            acc = acc.double();
        }
        acc + w
    })
}

fn prepare<C: CurveAffine>(points: &[C], scalars: &[C::Scalar]) -> (Vec<C::Curve>, Vec<Vec<i32>>, usize) {
    let word_size = window_size(points.len());
    let num_words = num_windows(C::Scalar::NUM_BITS as usize, word_size);
    let projective = points.iter().map(|p| p.to_curve()).collect();
    let digits = decompose_scalars_signed(scalars, num_words, word_size);
    (projective, digits, word_size)
}

/// Serial MSM. Extra points or scalars beyond the shorter slice are ignored.
pub fn msm<C: CurveAffine>(points: &[C], scalars: &[C::Scalar]) -> C::Curve {
    let n = points.len().min(scalars.len());
    let (points, digits, word_size) = prepare(&points[..n], &scalars[..n]);
    let window_sums: Vec<C::Curve> = digits
        .iter()
        .map(|w| running_sum_bucket_reduction::<C>(&bucket_accumulation::<C>(&points, w, word_size)))
        .collect();
    horner::<C>(&window_sums, word_size)
}

/// MSM with one rayon task per window.
#[cfg(not(target_arch = "wasm32"))]
pub fn msm_parallel<C: CurveAffine>(points: &[C], scalars: &[C::Scalar]) -> C::Curve {
    use rayon::prelude::*;

    let n = points.len().min(scalars.len());
    let (points, digits, word_size) = prepare(&points[..n], &scalars[..n]);
    let window_sums: Vec<C::Curve> = digits
        .par_iter()
        .map(|w| running_sum_bucket_reduction::<C>(&bucket_accumulation::<C>(&points, w, word_size)))
        .collect();
    horner::<C>(&window_sums, word_size)
}

/// No threads on wasm32, so this is the serial path.
#[cfg(target_arch = "wasm32")]
pub fn msm_parallel<C: CurveAffine>(points: &[C], scalars: &[C::Scalar]) -> C::Curve {
    msm(points, scalars)
}
