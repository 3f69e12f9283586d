//! # SMP State Machine
//!
//! One party's side of a run. The same type serves both roles: the party
//! that calls [`SmpStateMachine::transit`] with no input in `Initial`
//! becomes the initiator, the party that is handed a Message1 becomes the
//! responder.
//!
//! ```text
//!            begin                 Message2               Message4
//!  Initial ────────► AwaitingMsg2 ─────────► AwaitingMsg4 ─────────► Finished
//!     │
//!     │ Message1               Message3
//!     └─────────► AwaitingMsg3 ─────────► Finished
//! ```
//!
//! Two ways a transition can fail:
//!
//! - The frame does not parse, or carries the wrong message for the
//!   phase. The phase is left as it was and the caller may still feed the
//!   right message.
//! - The message parses but a proof or group element does not check out.
//!   The machine moves to `Aborted` and refuses all further input.

use std::fmt;

use ark_ed_on_bn254::Fr;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use super::error::{Result, SmpError};
use super::messages::{AnyMessage, Message1, Message2, Message3, Message4};
use super::proof::{
    prove_discrete_log, prove_equal_exponents, prove_shared_exponent, verify_discrete_log,
    verify_equal_exponents, verify_shared_exponent,
};
use super::secret::Secret;
use crate::config::{
    HASH_VERSION_G2A, HASH_VERSION_G2B, HASH_VERSION_G3A, HASH_VERSION_G3B,
    HASH_VERSION_PQ_INITIATOR, HASH_VERSION_PQ_RESPONDER, HASH_VERSION_R_INITIATOR,
    HASH_VERSION_R_RESPONDER,
};
use crate::crypto::curve::{
    check_group_element, exponentiate, exponentiate_generator, random_scalar, to_affine, Point,
    PointProjective,
};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Where a state machine is, without the secrets it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Nothing sent or received yet.
    Initial,
    /// Initiator sent Message1.
    AwaitingMsg2,
    /// Responder sent Message2.
    AwaitingMsg3,
    /// Initiator sent Message3.
    AwaitingMsg4,
    /// The comparison result is known.
    Finished,
    /// A peer message failed verification.
    Aborted,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Initial => "Initial",
            PhaseKind::AwaitingMsg2 => "AwaitingMsg2",
            PhaseKind::AwaitingMsg3 => "AwaitingMsg3",
            PhaseKind::AwaitingMsg4 => "AwaitingMsg4",
            PhaseKind::Finished => "Finished",
            PhaseKind::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// Initiator, after Message1.
struct SentMessage1 {
    a2: Fr,
    a3: Fr,
}

/// Responder, after Message2.
struct SentMessage2 {
    b3: Fr,
    g2: PointProjective,
    g3: PointProjective,
    g3a: Point,
    pb: PointProjective,
    qb: PointProjective,
}

/// Initiator, after Message3.
struct SentMessage3 {
    a3: Fr,
    g3b: Point,
    pa: PointProjective,
    pb: PointProjective,
    /// `Qa - Qb`
    delta: PointProjective,
}

enum Phase {
    Initial,
    AwaitingMsg2(SentMessage1),
    AwaitingMsg3(SentMessage2),
    AwaitingMsg4(SentMessage3),
    Finished(bool),
    Aborted,
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Phase::Initial => PhaseKind::Initial,
            Phase::AwaitingMsg2(_) => PhaseKind::AwaitingMsg2,
            Phase::AwaitingMsg3(_) => PhaseKind::AwaitingMsg3,
            Phase::AwaitingMsg4(_) => PhaseKind::AwaitingMsg4,
            Phase::Finished(_) => PhaseKind::Finished,
            Phase::Aborted => PhaseKind::Aborted,
        }
    }
}

// ---------------------------------------------------------------------------
// State Machine
// ---------------------------------------------------------------------------

/// One party's SMP session.
pub struct SmpStateMachine {
    secret: Fr,
    phase: Phase,
}

impl fmt::Debug for SmpStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmpStateMachine")
            .field("phase", &self.phase.kind())
            .finish_non_exhaustive()
    }
}

impl SmpStateMachine {
    /// Start a session for `secret`.
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self {
            secret: secret.into().to_scalar(),
            phase: Phase::Initial,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// True once the comparison result is available.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// Whether the two secrets were equal.
    ///
    /// Fails with [`SmpError::NotFinished`] before the run completes and
    /// with [`SmpError::Aborted`] after a verification failure.
    pub fn result(&self) -> Result<bool> {
        match self.phase {
            Phase::Finished(equal) => Ok(equal),
            Phase::Aborted => Err(SmpError::Aborted),
            _ => Err(SmpError::NotFinished),
        }
    }

    /// Advance the session using the operating system's CSPRNG.
    ///
    /// Pass `None` in `Initial` to begin as initiator; otherwise pass the
    /// peer's TLV frame. Returns the frame to send back, if any.
    pub fn transit(&mut self, incoming: Option<&[u8]>) -> Result<Option<Vec<u8>>> {
        self.transit_with_rng(incoming, &mut OsRng)
    }

    /// Advance the session drawing randomness from `rng`.
    pub fn transit_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &mut self,
        incoming: Option<&[u8]>,
        rng: &mut R,
    ) -> Result<Option<Vec<u8>>> {
        if matches!(self.phase, Phase::Aborted) {
            return Err(SmpError::Aborted);
        }

        let message = match incoming.map(AnyMessage::from_bytes).transpose() {
            Ok(message) => message,
            Err(e) => {
                warn!(phase = %self.phase(), error = %e, "rejected malformed SMP frame");
                return Err(e);
            }
        };
        let received = describe(message.as_ref());

        let phase = std::mem::replace(&mut self.phase, Phase::Aborted);
        let step = match (phase, message) {
            (Phase::Initial, None) => self.begin(rng),
            (Phase::Initial, Some(AnyMessage::Message1(m))) => self.on_message1(m, rng),
            (Phase::AwaitingMsg2(state), Some(AnyMessage::Message2(m))) => {
                self.on_message2(state, m, rng)
            }
            (Phase::AwaitingMsg3(state), Some(AnyMessage::Message3(m))) => {
                self.on_message3(state, m, rng)
            }
            (Phase::AwaitingMsg4(state), Some(AnyMessage::Message4(m))) => on_message4(state, m),
            (phase, _) => {
                let kind = phase.kind();
                self.phase = phase;
                warn!(phase = %kind, received = %received, "unexpected SMP message");
                return Err(SmpError::UnexpectedMessage {
                    phase: kind.to_string(),
                    message: received,
                });
            }
        };

        let (next, outgoing) = match step {
            Ok(step) => step,
            Err(e) => {
                warn!(received = %received, error = %e, "SMP run aborted");
                return Err(e);
            }
        };
        self.phase = next;

        if let Phase::Finished(equal) = self.phase {
            info!(equal, "SMP run finished");
        }

        match outgoing {
            Some(message) => {
                debug!(received = %received, sent = %message.kind(), phase = %self.phase(), "SMP transition");
                Ok(Some(message.serialize()?))
            }
            None => {
                debug!(received = %received, phase = %self.phase(), "SMP transition");
                Ok(None)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn begin<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Phase, Option<AnyMessage>)> {
        let a2 = random_scalar(rng);
        let a3 = random_scalar(rng);

        let message = Message1 {
            g2a: to_affine(&exponentiate_generator(&a2)),
            g2a_proof: prove_discrete_log(HASH_VERSION_G2A, &a2, rng)?,
            g3a: to_affine(&exponentiate_generator(&a3)),
            g3a_proof: prove_discrete_log(HASH_VERSION_G3A, &a3, rng)?,
        };

        Ok((
            Phase::AwaitingMsg2(SentMessage1 { a2, a3 }),
            Some(AnyMessage::Message1(message)),
        ))
    }

    fn on_message1<R: RngCore + CryptoRng + ?Sized>(
        &self,
        m: Message1,
        rng: &mut R,
    ) -> Result<(Phase, Option<AnyMessage>)> {
        check_group_element(&m.g2a, "g2a")?;
        check_group_element(&m.g3a, "g3a")?;
        verify_discrete_log(HASH_VERSION_G2A, &m.g2a, &m.g2a_proof)?;
        verify_discrete_log(HASH_VERSION_G3A, &m.g3a, &m.g3a_proof)?;

        let b2 = random_scalar(rng);
        let b3 = random_scalar(rng);
        let r = random_scalar(rng);

        let g2 = exponentiate(&m.g2a.into(), &b2);
        let g3 = exponentiate(&m.g3a.into(), &b3);
        let pb = exponentiate(&g3, &r);
        let qb = exponentiate_generator(&r) + exponentiate(&g2, &self.secret);

        let message = Message2 {
            g2b: to_affine(&exponentiate_generator(&b2)),
            g2b_proof: prove_discrete_log(HASH_VERSION_G2B, &b2, rng)?,
            g3b: to_affine(&exponentiate_generator(&b3)),
            g3b_proof: prove_discrete_log(HASH_VERSION_G3B, &b3, rng)?,
            pb: to_affine(&pb),
            qb: to_affine(&qb),
            pq_proof: prove_equal_exponents(
                HASH_VERSION_PQ_RESPONDER,
                &g2,
                &g3,
                &r,
                &self.secret,
                rng,
            )?,
        };

        Ok((
            Phase::AwaitingMsg3(SentMessage2 {
                b3,
                g2,
                g3,
                g3a: m.g3a,
                pb,
                qb,
            }),
            Some(AnyMessage::Message2(message)),
        ))
    }

    fn on_message2<R: RngCore + CryptoRng + ?Sized>(
        &self,
        state: SentMessage1,
        m: Message2,
        rng: &mut R,
    ) -> Result<(Phase, Option<AnyMessage>)> {
        check_group_element(&m.g2b, "g2b")?;
        check_group_element(&m.g3b, "g3b")?;
        check_group_element(&m.pb, "Pb")?;
        check_group_element(&m.qb, "Qb")?;
        verify_discrete_log(HASH_VERSION_G2B, &m.g2b, &m.g2b_proof)?;
        verify_discrete_log(HASH_VERSION_G3B, &m.g3b, &m.g3b_proof)?;

        let g2 = exponentiate(&m.g2b.into(), &state.a2);
        let g3 = exponentiate(&m.g3b.into(), &state.a3);
        verify_equal_exponents(
            HASH_VERSION_PQ_RESPONDER,
            &g2,
            &g3,
            &m.pb,
            &m.qb,
            &m.pq_proof,
        )?;

        let s = random_scalar(rng);
        let pa = exponentiate(&g3, &s);
        let qa = exponentiate_generator(&s) + exponentiate(&g2, &self.secret);
        let pb: PointProjective = m.pb.into();
        let qb: PointProjective = m.qb.into();
        let delta = qa - qb;
        let ra = exponentiate(&delta, &state.a3);

        let message = Message3 {
            pa: to_affine(&pa),
            qa: to_affine(&qa),
            pq_proof: prove_equal_exponents(
                HASH_VERSION_PQ_INITIATOR,
                &g2,
                &g3,
                &s,
                &self.secret,
                rng,
            )?,
            ra: to_affine(&ra),
            ra_proof: prove_shared_exponent(HASH_VERSION_R_INITIATOR, &state.a3, &delta, rng)?,
        };

        Ok((
            Phase::AwaitingMsg4(SentMessage3 {
                a3: state.a3,
                g3b: m.g3b,
                pa,
                pb,
                delta,
            }),
            Some(AnyMessage::Message3(message)),
        ))
    }

    fn on_message3<R: RngCore + CryptoRng + ?Sized>(
        &self,
        state: SentMessage2,
        m: Message3,
        rng: &mut R,
    ) -> Result<(Phase, Option<AnyMessage>)> {
        check_group_element(&m.pa, "Pa")?;
        check_group_element(&m.qa, "Qa")?;
        check_group_element(&m.ra, "Ra")?;
        verify_equal_exponents(
            HASH_VERSION_PQ_INITIATOR,
            &state.g2,
            &state.g3,
            &m.pa,
            &m.qa,
            &m.pq_proof,
        )?;

        let pa: PointProjective = m.pa.into();
        let qa: PointProjective = m.qa.into();
        let delta = qa - state.qb;
        verify_shared_exponent(
            HASH_VERSION_R_INITIATOR,
            &state.g3a,
            &delta,
            &m.ra,
            &m.ra_proof,
        )?;

        let rb = exponentiate(&delta, &state.b3);
        let message = Message4 {
            rb: to_affine(&rb),
            rb_proof: prove_shared_exponent(HASH_VERSION_R_RESPONDER, &state.b3, &delta, rng)?,
        };

        let rab = exponentiate(&m.ra.into(), &state.b3);
        let equal = rab == pa - state.pb;

        Ok((Phase::Finished(equal), Some(AnyMessage::Message4(message))))
    }
}

fn on_message4(state: SentMessage3, m: Message4) -> Result<(Phase, Option<AnyMessage>)> {
    check_group_element(&m.rb, "Rb")?;
    verify_shared_exponent(
        HASH_VERSION_R_RESPONDER,
        &state.g3b,
        &state.delta,
        &m.rb,
        &m.rb_proof,
    )?;

    let rab = exponentiate(&m.rb.into(), &state.a3);
    let equal = rab == state.pa - state.pb;

    Ok((Phase::Finished(equal), None))
}

fn describe(message: Option<&AnyMessage>) -> String {
    match message {
        Some(m) => m.kind().to_string(),
        None => "begin".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
