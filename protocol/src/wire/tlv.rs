//! # TLV Framing
//!
//! Every SMP message travels inside one type-length-value frame:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────┐
//! │ type u16 │ len u16  │ payload[len]     │
//! └──────────┴──────────┴──────────────────┘
//! ```
//!
//! This is the single gate for incoming bytes. Unknown tags, truncated
//! headers, and length mismatches are rejected here before any
//! cryptographic work starts.

use bytes::{BufMut, BytesMut};
use std::fmt;

use super::primitives::{take, Short, WireField};
use crate::config::{
    TLV_HEADER_LENGTH, TLV_MAX_PAYLOAD_LENGTH, TLV_TYPE_SMP_MESSAGE_1, TLV_TYPE_SMP_MESSAGE_2,
    TLV_TYPE_SMP_MESSAGE_3, TLV_TYPE_SMP_MESSAGE_4,
};
use crate::smp::error::{Result, SmpError};

/// The message types a TLV frame may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TlvType {
    /// First SMP message.
    SmpMessage1 = TLV_TYPE_SMP_MESSAGE_1,
    /// Second SMP message.
    SmpMessage2 = TLV_TYPE_SMP_MESSAGE_2,
    /// Third SMP message.
    SmpMessage3 = TLV_TYPE_SMP_MESSAGE_3,
    /// Fourth SMP message.
    SmpMessage4 = TLV_TYPE_SMP_MESSAGE_4,
}

impl TlvType {
    /// Map a wire tag to a known type.
    pub fn from_u16(tag: u16) -> Option<Self> {
        match tag {
            TLV_TYPE_SMP_MESSAGE_1 => Some(TlvType::SmpMessage1),
            TLV_TYPE_SMP_MESSAGE_2 => Some(TlvType::SmpMessage2),
            TLV_TYPE_SMP_MESSAGE_3 => Some(TlvType::SmpMessage3),
            TLV_TYPE_SMP_MESSAGE_4 => Some(TlvType::SmpMessage4),
            _ => None,
        }
    }

    /// The wire tag.
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for TlvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlvType::SmpMessage1 => write!(f, "SMPMessage1"),
            TlvType::SmpMessage2 => write!(f, "SMPMessage2"),
            TlvType::SmpMessage3 => write!(f, "SMPMessage3"),
            TlvType::SmpMessage4 => write!(f, "SMPMessage4"),
        }
    }
}

/// A type-length-value frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    kind: TlvType,
    value: Vec<u8>,
}

impl Tlv {
    /// Wrap `value` in a frame of type `kind`.
    ///
    /// Fails with a range error if the payload does not fit the 2-byte
    /// length field.
    pub fn new(kind: TlvType, value: Vec<u8>) -> Result<Self> {
        if value.len() > TLV_MAX_PAYLOAD_LENGTH {
            return Err(SmpError::Range(format!(
                "TLV payload of {} bytes exceeds {TLV_MAX_PAYLOAD_LENGTH}",
                value.len()
            )));
        }
        Ok(Self { kind, value })
    }

    /// The frame's type.
    pub fn kind(&self) -> TlvType {
        self.kind
    }

    /// The frame's payload.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Emit `type ‖ len ‖ payload`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(TLV_HEADER_LENGTH + self.value.len());
        Short::from(self.kind.as_u16()).encode_to(&mut buf);
        // Length fits: checked in `new`.
        Short::from(self.value.len() as u16).encode_to(&mut buf);
        buf.put_slice(&self.value);
        buf.to_vec()
    }

    /// Parse one complete frame. The buffer must hold exactly the header
    /// and the declared payload.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TLV_HEADER_LENGTH {
            return Err(SmpError::too_short(
                "TLV header",
                TLV_HEADER_LENGTH,
                bytes.len(),
            ));
        }
        let (tag, rest) = Short::consume(bytes)?;
        let (length, rest) = Short::consume(rest)?;

        let kind = TlvType::from_u16(tag.value())
            .ok_or_else(|| SmpError::Format(format!("unknown TLV type 0x{:04X}", tag.value())))?;

        let (value, rest) = take(rest, length.value() as usize, "TLV payload")?;
        if !rest.is_empty() {
            return Err(SmpError::Format(format!(
                "{} trailing bytes after TLV payload",
                rest.len()
            )));
        }

        Ok(Self {
            kind,
            value: value.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
