//! Supported curves and the process-wide parameter registry.

pub mod point;
pub mod registry;

use std::fmt;

use halo2curves::CurveAffine;
use serde::{Deserialize, Serialize};

use crate::error::MsmError;

/// Curve and encoding selector. Numeric tags are part of the calldata format.
///
/// Tag 4 is reserved for X25519/Ed25519 in Weierstrass form, which is not
/// compiled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum CurveId {
    Bn254 = 0,
    Bls12_381 = 1,
    Secp256k1 = 2,
    Secp256r1 = 3,
    Grumpkin = 5,
}

impl CurveId {
    pub const ALL: [CurveId; 5] = [
        CurveId::Bn254,
        CurveId::Bls12_381,
        CurveId::Secp256k1,
        CurveId::Secp256r1,
        CurveId::Grumpkin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CurveId::Bn254 => "BN254",
            CurveId::Bls12_381 => "BLS12_381",
            CurveId::Secp256k1 => "SECP256K1",
            CurveId::Secp256r1 => "SECP256R1",
            CurveId::Grumpkin => "GRUMPKIN",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            CurveId::Bn254 => 0,
            CurveId::Bls12_381 => 1,
            CurveId::Secp256k1 => 2,
            CurveId::Secp256r1 => 3,
            CurveId::Grumpkin => 4,
        }
    }
}

impl TryFrom<usize> for CurveId {
    type Error = MsmError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CurveId::Bn254),
            1 => Ok(CurveId::Bls12_381),
            2 => Ok(CurveId::Secp256k1),
            3 => Ok(CurveId::Secp256r1),
            5 => Ok(CurveId::Grumpkin),
            other => Err(MsmError::UnsupportedCurve(other)),
        }
    }
}

impl From<CurveId> for usize {
    fn from(id: CurveId) -> usize {
        id as usize
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A short Weierstrass curve the builder can emit calldata for.
pub trait MsmCurve: CurveAffine {
    const ID: CurveId;
    /// `E(Fp)` has prime order, so no subgroup check is needed.
    const PRIME_ORDER: bool;
}

impl MsmCurve for halo2curves::bn256::G1Affine {
    const ID: CurveId = CurveId::Bn254;
    const PRIME_ORDER: bool = true;
}

impl MsmCurve for halo2curves::bls12381::G1Affine {
    const ID: CurveId = CurveId::Bls12_381;
    const PRIME_ORDER: bool = false;
}

impl MsmCurve for halo2curves::secp256k1::Secp256k1Affine {
    const ID: CurveId = CurveId::Secp256k1;
    const PRIME_ORDER: bool = true;
}

impl MsmCurve for halo2curves::secp256r1::Secp256r1Affine {
    const ID: CurveId = CurveId::Secp256r1;
    const PRIME_ORDER: bool = true;
}

impl MsmCurve for halo2curves::grumpkin::G1Affine {
    const ID: CurveId = CurveId::Grumpkin;
    const PRIME_ORDER: bool = true;
}

/// Runs `$body` with `$C` bound to the affine type of `$id`.
macro_rules! with_curve {
    ($id:expr, $C:ident => $body:expr) => {
        match $id {
            $crate::curves::CurveId::Bn254 => {
                type $C = halo2curves::bn256::G1Affine;
                $body
            }
            $crate::curves::CurveId::Bls12_381 => {
                type $C = halo2curves::bls12381::G1Affine;
                $body
            }
            $crate::curves::CurveId::Secp256k1 => {
                type $C = halo2curves::secp256k1::Secp256k1Affine;
                $body
            }
            $crate::curves::CurveId::Secp256r1 => {
                type $C = halo2curves::secp256r1::Secp256r1Affine;
                $body
            }
            $crate::curves::CurveId::Grumpkin => {
                type $C = halo2curves::grumpkin::G1Affine;
                $body
            }
        }
    };
}
pub(crate) use with_curve;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_id_tags() {
        for id in CurveId::ALL {
            assert_eq!(CurveId::try_from(usize::from(id)), Ok(id));
        }
        assert_eq!(CurveId::try_from(4), Err(MsmError::UnsupportedCurve(4)));
        assert_eq!(CurveId::try_from(42), Err(MsmError::UnsupportedCurve(42)));
    }

    #[test]
    fn test_curve_id_serde() {
        let json = serde_json::to_string(&CurveId::Secp256r1).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<CurveId>("4").is_err());
    }
}
