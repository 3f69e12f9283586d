//! # Protocol Configuration & Constants
//!
//! Every magic number of the SMP engine lives here: TLV tags, hash domain
//! tags, wire widths, message sizes, and the default timeouts the drivers
//! use when waiting on a peer.
//!
//! Changing a tag or a width is a wire-breaking change. Peers running the
//! circom-based implementation must agree with every constant in the first
//! three sections bit for bit.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::smp::error::{Result, SmpError};

// ---------------------------------------------------------------------------
// TLV Tags
// ---------------------------------------------------------------------------

/// TLV type tag for the first SMP message (initiator → responder).
pub const TLV_TYPE_SMP_MESSAGE_1: u16 = 0x0002;

/// TLV type tag for the second SMP message (responder → initiator).
pub const TLV_TYPE_SMP_MESSAGE_2: u16 = 0x0003;

/// TLV type tag for the third SMP message (initiator → responder).
pub const TLV_TYPE_SMP_MESSAGE_3: u16 = 0x0004;

/// TLV type tag for the fourth SMP message (responder → initiator).
pub const TLV_TYPE_SMP_MESSAGE_4: u16 = 0x0005;

/// Size of the TLV header: 2-byte tag plus 2-byte length.
pub const TLV_HEADER_LENGTH: usize = 4;

/// Largest payload a single TLV can carry.
pub const TLV_MAX_PAYLOAD_LENGTH: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// Hash Domain Tags
// ---------------------------------------------------------------------------
//
// The first input to every Poseidon call. Each proof in the protocol gets
// its own tag so a transcript produced at one step cannot be replayed at
// another, or by the other party.

/// Initiator's proof of knowledge of `a2` (for `g2a`).
pub const HASH_VERSION_G2A: u8 = 1;

/// Initiator's proof of knowledge of `a3` (for `g3a`).
pub const HASH_VERSION_G3A: u8 = 2;

/// Responder's proof of knowledge of `b2` (for `g2b`).
pub const HASH_VERSION_G2B: u8 = 3;

/// Responder's proof of knowledge of `b3` (for `g3b`).
pub const HASH_VERSION_G3B: u8 = 4;

/// Responder's proof that `(Pb, Qb)` were built from the same exponent.
pub const HASH_VERSION_PQ_RESPONDER: u8 = 5;

/// Initiator's proof that `(Pa, Qa)` were built from the same exponent.
pub const HASH_VERSION_PQ_INITIATOR: u8 = 6;

/// Initiator's proof that `Ra` was raised to `a3`.
pub const HASH_VERSION_R_INITIATOR: u8 = 7;

/// Responder's proof that `Rb` was raised to `b3`.
pub const HASH_VERSION_R_RESPONDER: u8 = 8;

// ---------------------------------------------------------------------------
// Wire Widths
// ---------------------------------------------------------------------------

/// Width of a `Byte` on the wire.
pub const BYTE_LENGTH: usize = 1;

/// Width of a `Short` on the wire.
pub const SHORT_LENGTH: usize = 2;

/// Width of an `Int` on the wire.
pub const INT_LENGTH: usize = 4;

/// Width of a `Scalar` on the wire. 256 bits, big-endian.
pub const SCALAR_LENGTH: usize = 32;

/// Width of a compressed Baby Jubjub point on the wire.
pub const POINT_LENGTH: usize = 32;

/// Width of the length prefix in front of a `VarInt`.
pub const VARINT_LENGTH_PREFIX: usize = 4;

/// Longest `VarInt` value, in bytes, that its 4-byte prefix can describe.
pub const VARINT_MAX_VALUE_LENGTH: u64 = u32::MAX as u64;

/// Message1: `g2a, c2, d2, g3a, c3, d3`.
pub const MESSAGE_1_LENGTH: usize = 2 * POINT_LENGTH + 4 * SCALAR_LENGTH;

/// Message2: `g2b, c2, d2, g3b, c3, d3, Pb, Qb, cP, d5, d6`.
pub const MESSAGE_2_LENGTH: usize = 4 * POINT_LENGTH + 7 * SCALAR_LENGTH;

/// Message3: `Pa, Qa, cP, d5, d6, Ra, cR, d7`.
pub const MESSAGE_3_LENGTH: usize = 3 * POINT_LENGTH + 5 * SCALAR_LENGTH;

/// Message4: `Rb, cR, d7`.
pub const MESSAGE_4_LENGTH: usize = POINT_LENGTH + 2 * SCALAR_LENGTH;

// ---------------------------------------------------------------------------
// Timing Constants
// ---------------------------------------------------------------------------

/// How long a driver waits for an ordinary protocol message.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a driver waits for a message whose sender has to build several
/// proofs first (Message2 and Message3). Proof generation on a slow peer
/// can take a while, so this is deliberately generous.
pub const DEFAULT_PROOF_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Driver Configuration
// ---------------------------------------------------------------------------

/// Runtime knobs for the async SMP drivers.
///
/// Loadable from any serde format. Missing fields fall back to the
/// constants above.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmpConfig {
    /// Timeout for Message1 and Message4, in milliseconds.
    pub message_timeout_ms: u64,
    /// Timeout for Message2 and Message3, in milliseconds.
    pub proof_timeout_ms: u64,
}

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT.as_millis() as u64,
            proof_timeout_ms: DEFAULT_PROOF_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SmpConfig {
    /// Parse a configuration from JSON. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SmpError::Format(format!("invalid SMP config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero timeouts. A zero timeout would abort every run before
    /// the peer had a chance to answer.
    pub fn validate(&self) -> Result<()> {
        if self.message_timeout_ms == 0 || self.proof_timeout_ms == 0 {
            return Err(SmpError::Range("SMP timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Timeout for Message1 and Message4.
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    /// Timeout for Message2 and Message3.
    pub fn proof_timeout(&self) -> Duration {
        Duration::from_millis(self.proof_timeout_ms)
    }
}
