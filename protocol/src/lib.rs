// Copyright (c) 2026 Blind Find Contributors. MIT License.
// See LICENSE for details.

//! # Blind Find Protocol — SMP Engine
//!
//! Two peers want to know whether they hold the same value without showing
//! it to each other. This crate runs the Socialist Millionaires' Protocol
//! for them over Baby Jubjub, with Poseidon as the Fiat–Shamir hash so that
//! every transcript can also be checked inside a circom circuit.
//!
//! ## Architecture
//!
//! - **config** — TLV tags, hash domain tags, wire widths, timeouts.
//! - **crypto** — the curve, its subgroup, and the domain-separated hash.
//! - **wire** — integer, scalar and point codecs, and TLV framing.
//! - **smp** — messages, proofs, the per-party state machine, and async
//!   drivers.
//! - **logging** — `tracing` subscriber setup for embedding binaries.
//!
//! ## Quick Start
//!
//! ```
//! use blindfind_protocol::SmpStateMachine;
//!
//! let mut alice = SmpStateMachine::new("correct horse");
//! let mut bob = SmpStateMachine::new("correct horse");
//!
//! let msg1 = alice.transit(None)?.expect("Message1");
//! let msg2 = bob.transit(Some(&msg1))?.expect("Message2");
//! let msg3 = alice.transit(Some(&msg2))?.expect("Message3");
//! let msg4 = bob.transit(Some(&msg3))?.expect("Message4");
//! alice.transit(Some(&msg4))?;
//!
//! assert!(alice.result()?);
//! assert!(bob.result()?);
//! # Ok::<(), blindfind_protocol::SmpError>(())
//! ```
//!
//! The transport is the caller's: [`SmpStateMachine`] only turns frames
//! into frames. [`smp::run_initiator`] and [`smp::run_responder`] drive a
//! full run over any [`smp::SmpTransport`].

pub mod config;
pub mod crypto;
pub mod logging;
pub mod smp;
pub mod wire;

pub use config::SmpConfig;
pub use smp::{PhaseKind, Secret, SmpError, SmpStateMachine};
