use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Digit positions per scalar half. Covers every half up to 2^128 inclusive.
pub const N_DIGITS: usize = 82;

/// Balanced base -3 digits of `s`, least significant first, padded to
/// [`N_DIGITS`]. `None` if `s` needs more positions.
pub fn neg3_digits(s: &BigUint) -> Option<Vec<i8>> {
    let three = BigInt::from(3);
    let minus_three = BigInt::from(-3);
    let mut n = BigInt::from(s.clone());
    let mut digits = Vec::with_capacity(N_DIGITS);

    while !n.is_zero() {
        let d: i8 = match n.mod_floor(&three).to_u8() {
            Some(1) => 1,
            Some(2) => -1,
            _ => 0,
        };
        digits.push(d);
        n = (n - BigInt::from(d)) / &minus_three;
    }

    if digits.len() > N_DIGITS {
        return None;
    }
    digits.resize(N_DIGITS, 0);
    Some(digits)
}

/// Signed sums of `(-3)^k` over the positive and the negative digits of a
/// scalar, so that `ep - en` is the scalar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionWeights {
    #[serde(with = "crate::utils::tagged::signed")]
    pub ep: BigInt,
    #[serde(with = "crate::utils::tagged::signed")]
    pub en: BigInt,
}

impl PositionWeights {
    pub fn from_digits(digits: &[i8]) -> Self {
        let mut ep = BigInt::zero();
        let mut en = BigInt::zero();
        let mut power = BigInt::one();
        for d in digits {
            match d {
                1 => ep += &power,
                -1 => en += &power,
                _ => {}
            }
            power *= -3;
        }
        Self { ep, en }
    }

    pub fn for_scalar(s: &BigUint) -> Option<Self> {
        neg3_digits(s).map(|d| Self::from_digits(&d))
    }

    /// `ep - en`
    pub fn scalar(&self) -> BigInt {
        &self.ep - &self.en
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Num;

    fn reconstruct(digits: &[i8]) -> BigInt {
        digits
            .iter()
            .rev()
            .fold(BigInt::zero(), |acc, d| acc * -3 + BigInt::from(*d))
    }

    #[test]
    fn test_small_scalars() {
        assert_eq!(neg3_digits(&BigUint::zero()).unwrap(), vec![0; N_DIGITS]);
        // 10 = 1 + (-3)·(-3)
        let ten = neg3_digits(&BigUint::from(10u32)).unwrap();
        assert_eq!(&ten[..3], &[1, 0, 1]);
        assert!(ten[3..].iter().all(|d| *d == 0));
        // 2 = -1 + (-3)·(-1)
        assert_eq!(&neg3_digits(&BigUint::from(2u32)).unwrap()[..2], &[-1, -1]);
    }

    #[test]
    fn test_reconstruct_large() {
        let max = (BigUint::one() << 128usize) - 1u32;
        for s in [
            BigUint::from_str_radix("123456789abcdef0123456789abcdef", 16).unwrap(),
            max.clone(),
            max + 1u32,
        ] {
            let digits = neg3_digits(&s).unwrap();
            assert_eq!(digits.len(), N_DIGITS);
            assert_eq!(reconstruct(&digits), BigInt::from(s.clone()));
            assert_eq!(PositionWeights::for_scalar(&s).unwrap().scalar(), BigInt::from(s));
        }
    }

    #[test]
    fn test_too_wide() {
        assert!(neg3_digits(&(BigUint::one() << 129usize)).is_none());
    }

    #[test]
    fn test_weights_of_ten() {
        let w = PositionWeights::for_scalar(&BigUint::from(10u32)).unwrap();
        assert_eq!(w.ep, BigInt::from(10));
        assert!(w.en.is_zero());
    }
}
