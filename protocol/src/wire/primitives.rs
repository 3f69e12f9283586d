//! # Primitive Wire Types
//!
//! The atomic fields every SMP message is built from:
//!
//! ```text
//! Byte    1 byte,  big-endian, [0, 2^8)
//! Short   2 bytes, big-endian, [0, 2^16)
//! Int     4 bytes, big-endian, [0, 2^32)
//! Scalar 32 bytes, big-endian, [0, 2^256)
//! VarInt  4-byte big-endian length ‖ minimal big-endian value
//! ```
//!
//! Range checks happen at construction. Once a value exists it always
//! encodes; decoding is where malformed input is rejected.

use bytes::{BufMut, BytesMut};
use num_bigint::{BigInt as SignedBigInt, BigUint, Sign};

use ark_ed_on_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::config::{
    BYTE_LENGTH, INT_LENGTH, SCALAR_LENGTH, SHORT_LENGTH, VARINT_LENGTH_PREFIX,
    VARINT_MAX_VALUE_LENGTH,
};
use crate::smp::error::{Result, SmpError};

// ---------------------------------------------------------------------------
// WireField
// ---------------------------------------------------------------------------

/// A value with a canonical byte encoding.
///
/// Implementors provide `encode_to` and `consume`; `encode` and the strict
/// `decode` come for free.
pub trait WireField: Sized {
    /// Append the encoding of `self` to `buf`.
    fn encode_to(&self, buf: &mut BytesMut);

    /// Parse one value from the front of `bytes`, returning it together
    /// with whatever bytes were not consumed.
    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])>;

    /// Encode `self` into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.encode_to(&mut buf);
        buf.to_vec()
    }

    /// Parse a buffer that must contain exactly one value.
    fn decode(bytes: &[u8]) -> Result<Self> {
        let (value, rest) = Self::consume(bytes)?;
        if !rest.is_empty() {
            return Err(SmpError::Format(format!(
                "{} trailing bytes after value",
                rest.len()
            )));
        }
        Ok(value)
    }
}

/// Split `n` bytes off the front of `bytes` or fail with a format error.
pub(crate) fn take<'a>(bytes: &'a [u8], n: usize, what: &str) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < n {
        return Err(SmpError::too_short(what, n, bytes.len()));
    }
    Ok(bytes.split_at(n))
}

// ---------------------------------------------------------------------------
// Fixed-width integers
// ---------------------------------------------------------------------------

macro_rules! fixed_width_int {
    ($(#[$doc:meta])* $name:ident, $inner:ty, $size:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($inner);

        impl $name {
            /// Encoded width in bytes.
            pub const SIZE: usize = $size;

            /// Largest representable value.
            pub const MAX: Self = Self(<$inner>::MAX);

            /// The wrapped value.
            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl TryFrom<i128> for $name {
            type Error = SmpError;

            fn try_from(value: i128) -> Result<Self> {
                <$inner>::try_from(value).map(Self).map_err(|_| {
                    SmpError::Range(format!(
                        "{} must be in [0, 2^{}), got {}",
                        stringify!($name),
                        8 * $size,
                        value
                    ))
                })
            }
        }

        impl WireField for $name {
            fn encode_to(&self, buf: &mut BytesMut) {
                buf.put_slice(&self.0.to_be_bytes());
            }

            fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
                let (head, rest) = take(bytes, $size, stringify!($name))?;
                let mut raw = [0u8; $size];
                raw.copy_from_slice(head);
                Ok((Self(<$inner>::from_be_bytes(raw)), rest))
            }
        }
    };
}

fixed_width_int!(
    /// A 1-byte unsigned integer.
    Byte,
    u8,
    BYTE_LENGTH
);

fixed_width_int!(
    /// A 2-byte unsigned big-endian integer.
    Short,
    u16,
    SHORT_LENGTH
);

fixed_width_int!(
    /// A 4-byte unsigned big-endian integer.
    Int,
    u32,
    INT_LENGTH
);

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A 256-bit unsigned integer, encoded as 32 big-endian bytes.
///
/// `Scalar` accepts the whole `[0, 2^256)` range and does NOT reduce modulo
/// the subgroup order when constructed. Proof components arrive from the
/// peer in this form and are reduced with [`Scalar::to_field`] at the point
/// they enter group arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scalar([u8; SCALAR_LENGTH]);

impl Scalar {
    /// Encoded width in bytes.
    pub const SIZE: usize = SCALAR_LENGTH;

    /// `2^256 - 1`.
    pub const MAX: Self = Self([0xFF; SCALAR_LENGTH]);

    /// Build from a big-endian byte array. Every array is in range.
    pub fn from_be_bytes(bytes: [u8; SCALAR_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The value as a big integer.
    pub fn value(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Reduce into the subgroup scalar field.
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

impl From<Fr> for Scalar {
    fn from(value: Fr) -> Self {
        let mut bytes = [0u8; SCALAR_LENGTH];
        bytes.copy_from_slice(&value.into_bigint().to_bytes_be());
        Self(bytes)
    }
}

impl TryFrom<BigUint> for Scalar {
    type Error = SmpError;

    fn try_from(value: BigUint) -> Result<Self> {
        if value.bits() > (8 * SCALAR_LENGTH) as u64 {
            return Err(SmpError::Range(format!(
                "Scalar must be in [0, 2^256), got a {}-bit value",
                value.bits()
            )));
        }
        let raw = value.to_bytes_be();
        let mut bytes = [0u8; SCALAR_LENGTH];
        bytes[SCALAR_LENGTH - raw.len()..].copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl TryFrom<&SignedBigInt> for Scalar {
    type Error = SmpError;

    fn try_from(value: &SignedBigInt) -> Result<Self> {
        Scalar::try_from(non_negative(value, "Scalar")?)
    }
}

impl WireField for Scalar {
    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }

    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
        let (head, rest) = take(bytes, SCALAR_LENGTH, "Scalar")?;
        let mut raw = [0u8; SCALAR_LENGTH];
        raw.copy_from_slice(head);
        Ok((Self(raw), rest))
    }
}

// ---------------------------------------------------------------------------
// VarInt (MPI)
// ---------------------------------------------------------------------------

/// A variable-length non-negative integer.
///
/// Encoded as a 4-byte big-endian length followed by the minimal big-endian
/// representation of the value. Zero is a single zero byte, so `0` encodes
/// as `[0, 0, 0, 1, 0]`.
///
/// The value must fit in `2^32 - 1` bytes so that its length fits the
/// prefix; larger values are rejected by [`VarInt::new`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VarInt(BigUint);

impl VarInt {
    /// Wrap an unsigned value, rejecting one too long for the length prefix.
    pub fn new(value: BigUint) -> Result<Self> {
        check_varint_bits(value.bits())?;
        Ok(Self(value))
    }

    /// The wrapped value.
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for VarInt {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl TryFrom<i128> for VarInt {
    type Error = SmpError;

    fn try_from(value: i128) -> Result<Self> {
        Self::try_from(&SignedBigInt::from(value))
    }
}

impl TryFrom<&SignedBigInt> for VarInt {
    type Error = SmpError;

    fn try_from(value: &SignedBigInt) -> Result<Self> {
        non_negative(value, "VarInt").and_then(Self::new)
    }
}

impl WireField for VarInt {
    fn encode_to(&self, buf: &mut BytesMut) {
        // `to_bytes_be` of zero is `[0]`, which is exactly the wire form.
        // `new` bounds the length, so the prefix cast cannot truncate.
        let raw = self.0.to_bytes_be();
        buf.reserve(VARINT_LENGTH_PREFIX + raw.len());
        buf.put_u32(raw.len() as u32);
        buf.put_slice(&raw);
    }

    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
        if bytes.is_empty() {
            return Err(SmpError::Format("VarInt: empty buffer".to_string()));
        }
        let (prefix, rest) = Int::consume(bytes)?;
        let (raw, rest) = take(rest, prefix.value() as usize, "VarInt value")?;
        Ok((Self(BigUint::from_bytes_be(raw)), rest))
    }
}

fn check_varint_bits(bits: u64) -> Result<()> {
    let len = bits.div_ceil(8);
    if len > VARINT_MAX_VALUE_LENGTH {
        return Err(SmpError::Range(format!(
            "VarInt value of {len} bytes exceeds the {VARINT_MAX_VALUE_LENGTH}-byte limit"
        )));
    }
    Ok(())
}

fn non_negative(value: &SignedBigInt, what: &str) -> Result<BigUint> {
    match value.sign() {
        Sign::Minus => Err(SmpError::Range(format!(
            "{what} must be non-negative, got {value}"
        ))),
        _ => Ok(value.magnitude().clone()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
