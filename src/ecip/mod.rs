//! Elliptic curve inverse problem (ECIP) witnesses for MSM.
//!
//! A scalar is written in balanced base -3 and the MSM is accumulated one digit
//! level at a time. Each level is a principal divisor; the weighted sum of the
//! logarithmic derivatives of the level functions is the witness that lets a
//! verifier check `Q = Σ s_i·P_i` at three points of a random line.

pub mod digits;
pub mod divisor;
pub mod prover;
pub mod verify;

pub use digits::{neg3_digits, PositionWeights, N_DIGITS};
pub use prover::{zk_ecip_hint, EcipHint};
pub use verify::{RandomLine, Relation};
