//! # Cryptographic Collaborators
//!
//! The group and hash the SMP engine is built on. Nothing here is
//! protocol-specific: the curve is Baby Jubjub (circomlib form) and the
//! hash is circomlib-compatible Poseidon, both consumed from the arkworks
//! and light-poseidon crates rather than reimplemented.
//!
//! - **curve** — group arithmetic, generator, subgroup order, validity.
//! - **hash** — the domain-separated challenge hash.

pub mod curve;
pub mod hash;

pub use curve::{
    check_group_element, exponentiate, exponentiate_generator, generator, group_order, is_valid,
    random_scalar, BabyJubConfig, Point, PointProjective,
};
pub use hash::smp_hash;
