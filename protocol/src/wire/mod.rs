//! # Wire Format
//!
//! Byte-level encodings shared by every SMP message.
//!
//! ```text
//! primitives.rs — Byte, Short, Int, Scalar, VarInt and the WireField trait
//! point.rs      — compressed Baby Jubjub points
//! tlv.rs        — type-length-value frames
//! ```
//!
//! All multi-byte integers are big-endian, except the y-coordinate inside a
//! compressed point, which is little-endian to match circomlib.

pub mod point;
pub mod primitives;
pub mod tlv;

pub use point::{decode_point, encode_point};
pub use primitives::{Byte, Int, Scalar, Short, VarInt, WireField};
pub use tlv::{Tlv, TlvType};
