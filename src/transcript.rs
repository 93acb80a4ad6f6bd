//! Fiat-Shamir transcript using Keccak256.
//!
//! Integers are absorbed as 48-byte big-endian words, enough for every base
//! field here. A challenge is the digest reduced mod the group order; the
//! digest is absorbed back so consecutive challenges chain.

use num_bigint::BigUint;
use num_traits::Zero;
use sha3::{Digest, Keccak256};

use crate::curves::point::G1Point;
use crate::curves::CurveId;
use crate::utils::bigint::biguint_to_be_bytes_padded;

/// Bytes per absorbed integer.
pub const WORD_BYTES: usize = 48;

const DOMAIN_TAG: &[u8] = b"MSM_CALLDATA_ECIP_V1";

pub struct Transcript {
    hasher: Keccak256,
}

impl Transcript {
    /// New transcript bound to `curve`.
    pub fn new(curve: CurveId) -> Self {
        let mut transcript = Self {
            hasher: Keccak256::new(),
        };
        transcript.append_bytes(DOMAIN_TAG);
        transcript.append_u64(usize::from(curve) as u64);
        transcript
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    pub fn append_u64(&mut self, val: u64) {
        self.append_biguint(&BigUint::from(val));
    }

    /// `val` must fit in [`WORD_BYTES`].
    pub fn append_biguint(&mut self, val: &BigUint) {
        self.hasher.update(biguint_to_be_bytes_padded(val, WORD_BYTES));
    }

    /// Length prefix, then every element.
    pub fn append_biguints(&mut self, vals: &[BigUint]) {
        self.append_u64(vals.len() as u64);
        for v in vals {
            self.append_biguint(v);
        }
    }

    pub fn append_point(&mut self, point: &G1Point) {
        self.append_biguint(&point.x);
        self.append_biguint(&point.y);
    }

    /// Non-zero challenge below `order`.
    pub fn challenge(&mut self, order: &BigUint) -> BigUint {
        loop {
            let hash = self.hasher.finalize_reset();
            self.hasher.update(&hash);
            let c = BigUint::from_bytes_be(&hash) % order;
            if !c.is_zero() {
                return c;
            }
            log::trace!("transcript squeezed zero, squeezing again");
        }
    }
}
