//! # SMP Proofs
//!
//! The three non-interactive proofs SMP needs, all Fiat–Shamir over
//! [`smp_hash`]. In additive notation, with `g` the generator:
//!
//! ```text
//! Discrete log     A = g·a
//!   prove          c = H(v, g·r)                d = r - a·c
//!   verify         c == H(v, g·d + A·c)
//!
//! Equal exponents  P = g3·r,  Q = g·r + g2·x
//!   prove          c = H(v, g3·r1, g·r1 + g2·r2)
//!                  d1 = r1 - r·c   d2 = r2 - x·c
//!   verify         c == H(v, g3·d1 + P·c, g·d1 + g2·d2 + Q·c)
//!
//! Shared exponent  G = g·a,  R = Δ·a            (Δ = Qa - Qb)
//!   prove          c = H(v, g·r, Δ·r)           d = r - a·c
//!   verify         c == H(v, g·d + G·c, Δ·d + R·c)
//! ```
//!
//! Challenges are compared as encoded scalars, so a challenge that is
//! only congruent mod `l` to the recomputed one does not verify.
//! Responses are reduced mod `l` before use.

use ark_ed_on_bn254::Fr;
use rand_core::{CryptoRng, RngCore};

use super::messages::{EqualityProof, SchnorrProof};
use crate::crypto::curve::{
    exponentiate, exponentiate_generator, random_scalar, to_affine, Point, PointProjective,
};
use crate::crypto::hash::smp_hash;
use crate::smp::error::{Result, SmpError};
use crate::wire::Scalar;

fn hash(version: u8, points: &[PointProjective]) -> Result<Fr> {
    let affine: Vec<Point> = points.iter().map(to_affine).collect();
    smp_hash(version, &affine)
}

fn check_challenge(version: u8, claimed: &Scalar, recomputed: Fr) -> Result<()> {
    if *claimed == Scalar::from(recomputed) {
        Ok(())
    } else {
        Err(SmpError::VerificationFailed(format!(
            "proof with hash version {version} does not verify"
        )))
    }
}

// ---------------------------------------------------------------------------
// Discrete Log
// ---------------------------------------------------------------------------

/// Prove knowledge of `secret` such that `public = g·secret`.
pub fn prove_discrete_log<R: RngCore + CryptoRng + ?Sized>(
    version: u8,
    secret: &Fr,
    rng: &mut R,
) -> Result<SchnorrProof> {
    let r = random_scalar(rng);
    let c = hash(version, &[exponentiate_generator(&r)])?;
    let d = r - *secret * c;
    Ok(SchnorrProof {
        c: c.into(),
        d: d.into(),
    })
}

/// Check a [`prove_discrete_log`] proof against `public`.
pub fn verify_discrete_log(version: u8, public: &Point, proof: &SchnorrProof) -> Result<()> {
    let c = proof.c.to_field();
    let d = proof.d.to_field();
    let commitment = exponentiate_generator(&d) + exponentiate(&(*public).into(), &c);
    check_challenge(version, &proof.c, hash(version, &[commitment])?)
}

// ---------------------------------------------------------------------------
// Equal Exponents
// ---------------------------------------------------------------------------

/// Prove that `P = g3·r` and `Q = g·r + g2·x` for known `r`, `x`.
pub fn prove_equal_exponents<R: RngCore + CryptoRng + ?Sized>(
    version: u8,
    g2: &PointProjective,
    g3: &PointProjective,
    r: &Fr,
    x: &Fr,
    rng: &mut R,
) -> Result<EqualityProof> {
    let r1 = random_scalar(rng);
    let r2 = random_scalar(rng);
    let c = hash(
        version,
        &[
            exponentiate(g3, &r1),
            exponentiate_generator(&r1) + exponentiate(g2, &r2),
        ],
    )?;
    Ok(EqualityProof {
        c: c.into(),
        d1: (r1 - *r * c).into(),
        d2: (r2 - *x * c).into(),
    })
}

/// Check a [`prove_equal_exponents`] proof against `(p, q)`.
pub fn verify_equal_exponents(
    version: u8,
    g2: &PointProjective,
    g3: &PointProjective,
    p: &Point,
    q: &Point,
    proof: &EqualityProof,
) -> Result<()> {
    let c = proof.c.to_field();
    let d1 = proof.d1.to_field();
    let d2 = proof.d2.to_field();
    let first = exponentiate(g3, &d1) + exponentiate(&(*p).into(), &c);
    let second = exponentiate_generator(&d1) + exponentiate(g2, &d2) + exponentiate(&(*q).into(), &c);
    check_challenge(version, &proof.c, hash(version, &[first, second])?)
}

// ---------------------------------------------------------------------------
// Shared Exponent
// ---------------------------------------------------------------------------

/// Prove that `g·a` and `delta·a` share the exponent `a`.
pub fn prove_shared_exponent<R: RngCore + CryptoRng + ?Sized>(
    version: u8,
    a: &Fr,
    delta: &PointProjective,
    rng: &mut R,
) -> Result<SchnorrProof> {
    let r = random_scalar(rng);
    let c = hash(
        version,
        &[exponentiate_generator(&r), exponentiate(delta, &r)],
    )?;
    Ok(SchnorrProof {
        c: c.into(),
        d: (r - *a * c).into(),
    })
}

/// Check a [`prove_shared_exponent`] proof for `g_a = g·a`, `r = delta·a`.
pub fn verify_shared_exponent(
    version: u8,
    g_a: &Point,
    delta: &PointProjective,
    r: &Point,
    proof: &SchnorrProof,
) -> Result<()> {
    let c = proof.c.to_field();
    let d = proof.d.to_field();
    let first = exponentiate_generator(&d) + exponentiate(&(*g_a).into(), &c);
    let second = exponentiate(delta, &d) + exponentiate(&(*r).into(), &c);
    check_challenge(version, &proof.c, hash(version, &[first, second])?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
