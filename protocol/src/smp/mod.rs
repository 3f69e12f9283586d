//! # Socialist Millionaires' Protocol (SMP)
//!
//! Two parties learn whether they hold the same secret, and nothing else.
//! Each run is four messages in strict alternation:
//!
//! ```text
//!   ┌───────────┐                                  ┌───────────┐
//!   │ Initiator │                                  │ Responder │
//!   └─────┬─────┘                                  └─────┬─────┘
//!         │                                              │
//!         │  1. g2a, g3a + proofs of knowledge           │
//!         ├─────────────────────────────────────────────►│
//!         │                                              │
//!         │  2. g2b, g3b, Pb, Qb + proofs                │
//!         │◄─────────────────────────────────────────────┤
//!         │                                              │
//!         │  3. Pa, Qa, Ra + proofs                      │
//!         ├─────────────────────────────────────────────►│
//!         │                                              │
//!         │  4. Rb + proof                               │
//!         │◄─────────────────────────────────────────────┤
//!         │                                              │
//! ```
//!
//! After message 2 both sides share the bases `g2 = g·a2·b2` and
//! `g3 = g·a3·b3`. Each side then computes
//!
//! ```text
//! Rab = (Qa - Qb)·a3·b3     and compares it with     Pa - Pb
//! ```
//!
//! which agree exactly when `x = y`.
//!
//! ### `secret.rs`
//! Normalises caller input into an exponent.
//!
//! ### `messages.rs`
//! The four message types and their byte layout.
//!
//! ### `proof.rs`
//! Fiat–Shamir proofs attached to every commitment.
//!
//! ### `state.rs`
//! The per-party state machine. No I/O.
//!
//! ### `driver.rs`
//! Async drivers that run the state machine over a transport with
//! timeouts.

pub mod driver;
pub mod error;
pub mod messages;
pub mod proof;
pub mod secret;
pub mod state;

pub use driver::{run_initiator, run_responder, ChannelTransport, SmpTransport};
pub use error::{Result, SmpError};
pub use messages::{
    AnyMessage, EqualityProof, Message1, Message2, Message3, Message4, SchnorrProof, SmpMessage,
};
pub use secret::Secret;
pub use state::{PhaseKind, SmpStateMachine};
