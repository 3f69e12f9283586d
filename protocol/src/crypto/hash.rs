//! # SMP Hash
//!
//! Fiat–Shamir challenges are derived with Poseidon over the BN254 scalar
//! field, using circomlib's round constants so that the same transcript
//! can be recomputed inside a circuit.
//!
//! The first input is always the domain tag (`version`). The remaining
//! inputs are the affine coordinates of the committed points, in order:
//!
//! ```text
//! H(version, P₁, …, Pₙ) = Poseidon([version, P₁.x, P₁.y, …, Pₙ.x, Pₙ.y]) mod l
//! ```
//!
//! Poseidon's output lives in the base field; it is reduced modulo the
//! subgroup order before being used as a challenge.

use ark_ed_on_bn254::{Fq, Fr};
use light_poseidon::{Poseidon, PoseidonHasher};

use super::curve::{base_to_scalar, Point};
use crate::smp::error::{Result, SmpError};

/// Largest number of points a single challenge can commit to. circomlib's
/// Poseidon takes at most 16 inputs; light-poseidon stops at 12, and one
/// slot goes to the domain tag.
pub const MAX_HASHED_POINTS: usize = 5;

/// Domain-separated Poseidon hash of a list of points.
pub fn smp_hash(version: u8, points: &[Point]) -> Result<Fr> {
    if points.is_empty() || points.len() > MAX_HASHED_POINTS {
        return Err(SmpError::Crypto(format!(
            "cannot hash {} points (allowed: 1..={MAX_HASHED_POINTS})",
            points.len()
        )));
    }

    let mut inputs = Vec::with_capacity(1 + 2 * points.len());
    inputs.push(Fq::from(version));
    for point in points {
        inputs.push(point.x);
        inputs.push(point.y);
    }

    let mut poseidon =
        Poseidon::<Fq>::new_circom(inputs.len()).map_err(|e| SmpError::Crypto(e.to_string()))?;
    let digest = poseidon
        .hash(&inputs)
        .map_err(|e| SmpError::Crypto(e.to_string()))?;

    Ok(base_to_scalar(&digest))
}
