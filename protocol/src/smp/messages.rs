//! # SMP Messages
//!
//! The four messages of one SMP run. Each is a fixed sequence of
//! compressed points and 32-byte scalars, wrapped in a single TLV frame.
//!
//! ```text
//! Message1  g2a  c2 d2  g3a  c3 d3
//! Message2  g2b  c2 d2  g3b  c3 d3  Pb Qb  cP d5 d6
//! Message3  Pa Qa  cP d5 d6  Ra  cR d7
//! Message4  Rb  cR d7
//! ```
//!
//! Messages are plain data. Building them is the state machine's job,
//! and so is checking their proofs; this module only moves bytes.

use bytes::BytesMut;

use crate::config::{MESSAGE_1_LENGTH, MESSAGE_2_LENGTH, MESSAGE_3_LENGTH, MESSAGE_4_LENGTH};
use crate::crypto::curve::Point;
use crate::smp::error::{Result, SmpError};
use crate::wire::{Scalar, Tlv, TlvType, WireField};

// ---------------------------------------------------------------------------
// Proof Payloads
// ---------------------------------------------------------------------------

/// A Schnorr-style proof: challenge `c` and response `d`.
///
/// Used both for plain knowledge of a discrete log and for the `R`
/// proofs, whose single response covers two bases at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrProof {
    /// Fiat–Shamir challenge.
    pub c: Scalar,
    /// Response `r - secret·c mod l`.
    pub d: Scalar,
}

impl WireField for SchnorrProof {
    fn encode_to(&self, buf: &mut BytesMut) {
        self.c.encode_to(buf);
        self.d.encode_to(buf);
    }

    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
        let (c, rest) = Scalar::consume(bytes)?;
        let (d, rest) = Scalar::consume(rest)?;
        Ok((Self { c, d }, rest))
    }
}

/// Proof that `P = g3^r` and `Q = g^r·g2^x` share the exponent `r`, and
/// that the prover knows both `r` and `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EqualityProof {
    /// Fiat–Shamir challenge.
    pub c: Scalar,
    /// Response for the blinding exponent `r`.
    pub d1: Scalar,
    /// Response for the secret `x`.
    pub d2: Scalar,
}

impl WireField for EqualityProof {
    fn encode_to(&self, buf: &mut BytesMut) {
        self.c.encode_to(buf);
        self.d1.encode_to(buf);
        self.d2.encode_to(buf);
    }

    fn consume(bytes: &[u8]) -> Result<(Self, &[u8])> {
        let (c, rest) = Scalar::consume(bytes)?;
        let (d1, rest) = Scalar::consume(rest)?;
        let (d2, rest) = Scalar::consume(rest)?;
        Ok((Self { c, d1, d2 }, rest))
    }
}

// ---------------------------------------------------------------------------
// Field Reader
// ---------------------------------------------------------------------------

/// Reads fields off a payload in order, then insists nothing is left.
pub struct FieldReader<'a> {
    rest: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Start reading `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    /// Read the next field.
    pub fn read<T: WireField>(&mut self) -> Result<T> {
        let (value, rest) = T::consume(self.rest)?;
        self.rest = rest;
        Ok(value)
    }

    /// Fail if any bytes remain unread.
    pub fn finish(self) -> Result<()> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(SmpError::Format(format!(
                "{} unread bytes after last field",
                self.rest.len()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Message Trait
// ---------------------------------------------------------------------------

/// Common behaviour of the four SMP messages.
pub trait SmpMessage: Sized {
    /// TLV tag this message travels under.
    const TLV_TYPE: TlvType;

    /// Exact payload length in bytes.
    const LENGTH: usize;

    /// Append the fields, in wire order.
    fn encode_fields(&self, buf: &mut BytesMut);

    /// Read the fields, in wire order.
    fn decode_fields(reader: &mut FieldReader<'_>) -> Result<Self>;

    /// Wrap the encoded fields in a TLV frame.
    fn to_tlv(&self) -> Result<Tlv> {
        let mut buf = BytesMut::with_capacity(Self::LENGTH);
        self.encode_fields(&mut buf);
        Tlv::new(Self::TLV_TYPE, buf.to_vec())
    }

    /// Parse a frame that must carry this message type.
    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        if tlv.kind() != Self::TLV_TYPE {
            return Err(SmpError::Format(format!(
                "expected {} frame, got {}",
                Self::TLV_TYPE,
                tlv.kind()
            )));
        }
        if tlv.value().len() != Self::LENGTH {
            return Err(SmpError::Format(format!(
                "{} payload must be {} bytes, got {}",
                Self::TLV_TYPE,
                Self::LENGTH,
                tlv.value().len()
            )));
        }
        let mut reader = FieldReader::new(tlv.value());
        let message = Self::decode_fields(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }

    /// Serialise straight to framed bytes.
    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.to_tlv()?.serialize())
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Initiator → responder. Commitments to `a2`, `a3` with proofs of
/// knowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message1 {
    /// `g^a2`
    pub g2a: Point,
    /// Proof of knowledge of `a2`.
    pub g2a_proof: SchnorrProof,
    /// `g^a3`
    pub g3a: Point,
    /// Proof of knowledge of `a3`.
    pub g3a_proof: SchnorrProof,
}

impl SmpMessage for Message1 {
    const TLV_TYPE: TlvType = TlvType::SmpMessage1;
    const LENGTH: usize = MESSAGE_1_LENGTH;

    fn encode_fields(&self, buf: &mut BytesMut) {
        self.g2a.encode_to(buf);
        self.g2a_proof.encode_to(buf);
        self.g3a.encode_to(buf);
        self.g3a_proof.encode_to(buf);
    }

    fn decode_fields(reader: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            g2a: reader.read()?,
            g2a_proof: reader.read()?,
            g3a: reader.read()?,
            g3a_proof: reader.read()?,
        })
    }
}

/// Responder → initiator. Commitments to `b2`, `b3`, the responder's
/// `(Pb, Qb)` pair, and proofs for all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message2 {
    /// `g^b2`
    pub g2b: Point,
    /// Proof of knowledge of `b2`.
    pub g2b_proof: SchnorrProof,
    /// `g^b3`
    pub g3b: Point,
    /// Proof of knowledge of `b3`.
    pub g3b_proof: SchnorrProof,
    /// `Pb = g3^r`
    pub pb: Point,
    /// `Qb = g^r · g2^y`
    pub qb: Point,
    /// Proof that `Pb` and `Qb` share `r`.
    pub pq_proof: EqualityProof,
}

impl SmpMessage for Message2 {
    const TLV_TYPE: TlvType = TlvType::SmpMessage2;
    const LENGTH: usize = MESSAGE_2_LENGTH;

    fn encode_fields(&self, buf: &mut BytesMut) {
        self.g2b.encode_to(buf);
        self.g2b_proof.encode_to(buf);
        self.g3b.encode_to(buf);
        self.g3b_proof.encode_to(buf);
        self.pb.encode_to(buf);
        self.qb.encode_to(buf);
        self.pq_proof.encode_to(buf);
    }

    fn decode_fields(reader: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            g2b: reader.read()?,
            g2b_proof: reader.read()?,
            g3b: reader.read()?,
            g3b_proof: reader.read()?,
            pb: reader.read()?,
            qb: reader.read()?,
            pq_proof: reader.read()?,
        })
    }
}

/// Initiator → responder. The initiator's `(Pa, Qa)` pair and `Ra`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message3 {
    /// `Pa = g3^s`
    pub pa: Point,
    /// `Qa = g^s · g2^x`
    pub qa: Point,
    /// Proof that `Pa` and `Qa` share `s`.
    pub pq_proof: EqualityProof,
    /// `Ra = (Qa / Qb)^a3`
    pub ra: Point,
    /// Proof that `Ra` used the same `a3` as `g3a`.
    pub ra_proof: SchnorrProof,
}

impl SmpMessage for Message3 {
    const TLV_TYPE: TlvType = TlvType::SmpMessage3;
    const LENGTH: usize = MESSAGE_3_LENGTH;

    fn encode_fields(&self, buf: &mut BytesMut) {
        self.pa.encode_to(buf);
        self.qa.encode_to(buf);
        self.pq_proof.encode_to(buf);
        self.ra.encode_to(buf);
        self.ra_proof.encode_to(buf);
    }

    fn decode_fields(reader: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            pa: reader.read()?,
            qa: reader.read()?,
            pq_proof: reader.read()?,
            ra: reader.read()?,
            ra_proof: reader.read()?,
        })
    }
}

/// Responder → initiator. `Rb`, closing the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message4 {
    /// `Rb = (Qa / Qb)^b3`
    pub rb: Point,
    /// Proof that `Rb` used the same `b3` as `g3b`.
    pub rb_proof: SchnorrProof,
}

impl SmpMessage for Message4 {
    const TLV_TYPE: TlvType = TlvType::SmpMessage4;
    const LENGTH: usize = MESSAGE_4_LENGTH;

    fn encode_fields(&self, buf: &mut BytesMut) {
        self.rb.encode_to(buf);
        self.rb_proof.encode_to(buf);
    }

    fn decode_fields(reader: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            rb: reader.read()?,
            rb_proof: reader.read()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Any one of the four messages, as parsed off the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyMessage {
    /// See [`Message1`].
    Message1(Message1),
    /// See [`Message2`].
    Message2(Message2),
    /// See [`Message3`].
    Message3(Message3),
    /// See [`Message4`].
    Message4(Message4),
}

impl AnyMessage {
    /// Parse a frame, dispatching on its tag.
    pub fn from_tlv(tlv: &Tlv) -> Result<Self> {
        Ok(match tlv.kind() {
            TlvType::SmpMessage1 => AnyMessage::Message1(Message1::from_tlv(tlv)?),
            TlvType::SmpMessage2 => AnyMessage::Message2(Message2::from_tlv(tlv)?),
            TlvType::SmpMessage3 => AnyMessage::Message3(Message3::from_tlv(tlv)?),
            TlvType::SmpMessage4 => AnyMessage::Message4(Message4::from_tlv(tlv)?),
        })
    }

    /// Parse raw framed bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_tlv(&Tlv::deserialize(bytes)?)
    }

    /// The message's TLV tag.
    pub fn kind(&self) -> TlvType {
        match self {
            AnyMessage::Message1(_) => TlvType::SmpMessage1,
            AnyMessage::Message2(_) => TlvType::SmpMessage2,
            AnyMessage::Message3(_) => TlvType::SmpMessage3,
            AnyMessage::Message4(_) => TlvType::SmpMessage4,
        }
    }

    /// Serialise to framed bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            AnyMessage::Message1(m) => m.serialize(),
            AnyMessage::Message2(m) => m.serialize(),
            AnyMessage::Message3(m) => m.serialize(),
            AnyMessage::Message4(m) => m.serialize(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
