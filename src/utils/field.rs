use ff::PrimeField;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Num;

/// Modulus of `F` parsed from its `MODULUS` hex string.
pub fn modulus<F: PrimeField>() -> BigUint {
    let hex = F::MODULUS.trim_start_matches("0x");
    BigUint::from_str_radix(hex, 16).unwrap_or_default()
}

/// Canonical integer value of a field element. Reprs are little-endian.
pub fn field_to_biguint<F: PrimeField>(value: &F) -> BigUint {
    let repr = value.to_repr();
    BigUint::from_bytes_le(repr.as_ref())
}

/// Field element with canonical value `n`, or `None` when `n >= modulus`.
pub fn biguint_to_field<F: PrimeField>(n: &BigUint) -> Option<F> {
    let bytes = n.to_bytes_le();
    let mut repr = F::Repr::default();
    if bytes.len() > repr.as_ref().len() {
        return None;
    }
    repr.as_mut()[..bytes.len()].copy_from_slice(&bytes);
    Option::from(F::from_repr(repr))
}

/// Reduces an arbitrary non-negative integer into `F`.
pub fn reduce_to_field<F: PrimeField>(n: &BigUint, modulus: &BigUint) -> F {
    let reduced = n % modulus;
    // `reduced < modulus`, so the conversion cannot fail.
    biguint_to_field(&reduced).unwrap_or(F::ZERO)
}

/// Reduces a signed integer into `F`.
pub fn bigint_to_field<F: PrimeField>(n: &BigInt, modulus: &BigUint) -> F {
    let value = reduce_to_field::<F>(n.magnitude(), modulus);
    match n.sign() {
        Sign::Minus => -value,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use halo2curves::bn256::Fq;
    use halo2curves::secp256k1::Fp as Secp256k1Fp;

    #[test]
    fn test_field_to_biguint() {
        let field = Fq::random(rand::thread_rng());
        let n = field_to_biguint(&field);
        assert!(n < modulus::<Fq>());
        assert_eq!(biguint_to_field::<Fq>(&n), Some(field));
    }

    #[test]
    fn test_small_values() {
        assert_eq!(field_to_biguint(&Fq::from(258)), BigUint::from(258u32));
        assert_eq!(field_to_biguint(&Secp256k1Fp::from(258)), BigUint::from(258u32));
    }

    #[test]
    fn test_out_of_range() {
        let p = modulus::<Fq>();
        assert_eq!(biguint_to_field::<Fq>(&p), None);
        assert_eq!(reduce_to_field::<Fq>(&(p.clone() + 5u32), &p), Fq::from(5));
    }

    #[test]
    fn test_signed_reduction() {
        let p = modulus::<Fq>();
        let minus_three = BigInt::from(-3);
        assert_eq!(bigint_to_field::<Fq>(&minus_three, &p), -Fq::from(3));
    }

    #[test]
    fn test_bn254_modulus() {
        let fp = BigUint::from_str_radix("21888242871839275222246405745257275088696311157297823662689037894645226208583", 10).unwrap();
        assert_eq!(modulus::<Fq>(), fp);
    }
}
