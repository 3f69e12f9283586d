//! # Compressed Point Codec
//!
//! The standard compressed twisted-Edwards encoding, byte-compatible with
//! circomlib's `packPoint` / `unpackPoint`:
//!
//! ```text
//! bytes[0..32] = y as a 256-bit little-endian integer
//! bytes[31]   |= 0x80 if x > (p - 1) / 2
//! ```
//!
//! `p` is a 254-bit prime, so the top bit of `y` is always free for the
//! sign of `x`. Decoding solves the curve equation for `x²`:
//!
//! ```text
//! x² = (1 - y²) / (a - d·y²)
//! ```
//!
//! and picks the root whose sign matches the flag.

use ark_ec::twisted_edwards::TECurveConfig;
use ark_ed_on_bn254::Fq;
use ark_ff::{BigInt, BigInteger, Field, One, PrimeField, Zero};
use bytes::{BufMut, BytesMut};

use super::primitives::{take, WireField};
use crate::config::POINT_LENGTH;
use crate::crypto::curve::{BabyJubConfig, Point};
use crate::smp::error::{Result, SmpError};

const SIGN_MASK: u8 = 0x80;

/// True when `x` lies in the upper half of the field.
fn is_negative(x: &Fq) -> bool {
    x.into_bigint() > Fq::MODULUS_MINUS_ONE_DIV_TWO
}

/// Compress a point to 32 bytes.
pub fn encode_point(point: &Point) -> [u8; POINT_LENGTH] {
    let mut out = [0u8; POINT_LENGTH];
    out.copy_from_slice(&point.y.into_bigint().to_bytes_le());
    if is_negative(&point.x) {
        out[POINT_LENGTH - 1] |= SIGN_MASK;
    }
    out
}

/// Decompress 32 bytes into a point on the curve.
///
/// Fails with a format error when the buffer has the wrong length, when
/// `y` is not a canonical field element, or when no `x` with the requested
/// sign satisfies the curve equation. The result is on the curve but NOT
/// necessarily in the prime-order subgroup; callers that need subgroup
/// membership check it separately.
pub fn decode_point(bytes: &[u8]) -> Result<Point> {
    if bytes.len() != POINT_LENGTH {
        return Err(SmpError::Format(format!(
            "Point: expected {POINT_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }

    let mut raw = [0u8; POINT_LENGTH];
    raw.copy_from_slice(bytes);
    let negative = raw[POINT_LENGTH - 1] & SIGN_MASK != 0;
    raw[POINT_LENGTH - 1] &= !SIGN_MASK;

    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(raw.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(word);
    }
    let y = Fq::from_bigint(BigInt::new(limbs))
        .ok_or_else(|| SmpError::Format("Point: y is not a canonical field element".into()))?;

    let x = recover_x(&y, negative)
        .ok_or_else(|| SmpError::Format("Point: no curve point with this y and sign".into()))?;

    let point = Point::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(SmpError::Format("Point: not on curve".into()));
    }
    Ok(point)
}

fn recover_x(y: &Fq, negative: bool) -> Option<Fq> {
    let y2 = y.square();
    let numerator = Fq::one() - y2;
    let denominator =
        <BabyJubConfig as TECurveConfig>::COEFF_A - <BabyJubConfig as TECurveConfig>::COEFF_D * y2;
    let x2 = numerator * denominator.inverse()?;
    let x = x2.sqrt()?;

    if x.is_zero() {
        // Zero has no negative twin; a set sign bit is malformed.
        return (!negative).then_some(x);
    }
    Some(if is_negative(&x) == negative { x } else { -x })
}

impl WireField for Point {
    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&encode_point(self));
    }

    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
        let (head, rest) = take(bytes, POINT_LENGTH, "Point")?;
        Ok((decode_point(head)?, rest))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
