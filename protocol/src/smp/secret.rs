//! # Secrets
//!
//! The value a party feeds into SMP. Callers hand us whatever shape they
//! have; [`Secret::to_scalar`] is the one place it becomes an exponent.
//!
//! | Variant   | Mapping to the scalar field              |
//! |-----------|------------------------------------------|
//! | `Integer` | the integer itself, mod `l`              |
//! | `Big`     | the integer itself, mod `l`              |
//! | `Text`    | its UTF-8 bytes, then as `Bytes`         |
//! | `Bytes`   | `SHA-256(bytes)` read big-endian, mod `l` |
//!
//! Two parties only compare equal if they used the same representation:
//! `Integer(1)` and `Text("1")` are different secrets.

use ark_ed_on_bn254::Fr;
use ark_ff::PrimeField;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// A party's private input.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// A small integer.
    Integer(u64),
    /// An arbitrary-size non-negative integer.
    Big(BigUint),
    /// A string.
    Text(String),
    /// A raw byte buffer.
    Bytes(Vec<u8>),
}

impl Secret {
    /// Normalise the secret into an exponent. Deterministic and total.
    pub fn to_scalar(&self) -> Fr {
        match self {
            Secret::Integer(value) => Fr::from(*value),
            Secret::Big(value) => Fr::from_be_bytes_mod_order(&value.to_bytes_be()),
            Secret::Text(text) => hash_bytes(text.as_bytes()),
            Secret::Bytes(bytes) => hash_bytes(bytes),
        }
    }
}

fn hash_bytes(bytes: &[u8]) -> Fr {
    let digest = Sha256::digest(bytes);
    Fr::from_be_bytes_mod_order(&digest)
}

// Secrets never show up in logs or panic messages.
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Secret::Integer(_) => "Integer",
            Secret::Big(_) => "Big",
            Secret::Text(_) => "Text",
            Secret::Bytes(_) => "Bytes",
        };
        write!(f, "Secret::{kind}(<redacted>)")
    }
}

impl From<u64> for Secret {
    fn from(value: u64) -> Self {
        Secret::Integer(value)
    }
}

impl From<u32> for Secret {
    fn from(value: u32) -> Self {
        Secret::Integer(value.into())
    }
}

impl From<BigUint> for Secret {
    fn from(value: BigUint) -> Self {
        Secret::Big(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret::Text(value.to_string())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret::Text(value)
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Secret::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Secret::Bytes(value)
    }
}
