use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Bits per limb of the u384 encoding used in calldata.
pub const LIMB_BITS: usize = 96;
/// Limbs per emulated field element.
pub const N_LIMBS: usize = 4;

fn mask(bits: usize) -> BigUint {
    (BigUint::one() << bits) - BigUint::one()
}

/// Splits `a` into `N_LIMBS` limbs of 96 bits, least significant first.
/// `a` must be below 2^384.
pub fn biguint_to_u384_limbs(a: &BigUint) -> [BigUint; N_LIMBS] {
    debug_assert!(a.bits() as usize <= LIMB_BITS * N_LIMBS);
    let m = mask(LIMB_BITS);
    std::array::from_fn(|i| (a >> (i * LIMB_BITS)) & &m)
}

/// Inverse of [`biguint_to_u384_limbs`]. Returns `None` if a limb overflows 96 bits.
pub fn u384_limbs_to_biguint(limbs: &[BigUint]) -> Option<BigUint> {
    if limbs.len() != N_LIMBS {
        return None;
    }
    // For each limb, add limb * (2^96)^position
    let mut result = BigUint::zero();
    for (i, limb) in limbs.iter().enumerate() {
        if limb.bits() as usize > LIMB_BITS {
            return None;
        }
        result += limb << (i * LIMB_BITS);
    }
    Some(result)
}

/// Splits a 256-bit value into its (low, high) 128-bit halves.
pub fn split_u256(a: &BigUint) -> (BigUint, BigUint) {
    debug_assert!(a.bits() <= 256);
    (a & mask(128), a >> 128usize)
}

pub fn join_u256(low: &BigUint, high: &BigUint) -> BigUint {
    (high << 128usize) + low
}

pub fn biguint_to_be_bytes_padded(a: &BigUint, len: usize) -> Vec<u8> {
    let bytes = a.to_bytes_be();
    debug_assert!(bytes.len() <= len);
    let mut out = vec![0u8; len.saturating_sub(bytes.len())];
    out.extend_from_slice(&bytes);
    out
}
