//! # SMP Drivers
//!
//! Run a whole SMP exchange over a transport. The state machine does no
//! I/O; these drivers pump its frames through an [`SmpTransport`] and put
//! a deadline on every wait for the peer.
//!
//! | Waiting for | Timeout                          |
//! |-------------|----------------------------------|
//! | Message1    | [`SmpConfig::message_timeout`]   |
//! | Message2    | [`SmpConfig::proof_timeout`]     |
//! | Message3    | [`SmpConfig::proof_timeout`]     |
//! | Message4    | [`SmpConfig::message_timeout`]   |

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::error::{Result, SmpError};
use super::secret::Secret;
use super::state::SmpStateMachine;
use crate::config::SmpConfig;
use crate::wire::TlvType;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Moves TLV frames between the two parties. Framing beyond that (length
/// prefixes on a stream, session routing) is the implementor's concern.
#[async_trait]
pub trait SmpTransport: Send {
    /// Deliver one frame to the peer.
    async fn send(&mut self, frame: Vec<u8>) -> Result<()>;

    /// Wait for the next frame from the peer.
    async fn recv(&mut self) -> Result<Vec<u8>>;
}

/// In-memory transport over a pair of tokio channels.
#[derive(Debug)]
pub struct ChannelTransport {
    outgoing: mpsc::Sender<Vec<u8>>,
    incoming: mpsc::Receiver<Vec<u8>>,
}

impl ChannelTransport {
    /// Two connected endpoints, each buffering up to `capacity` frames.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (
            Self {
                outgoing: a_tx,
                incoming: a_rx,
            },
            Self {
                outgoing: b_tx,
                incoming: b_rx,
            },
        )
    }
}

#[async_trait]
impl SmpTransport for ChannelTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<()> {
        self.outgoing
            .send(frame)
            .await
            .map_err(|_| SmpError::Transport("peer endpoint dropped".into()))
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        self.incoming
            .recv()
            .await
            .ok_or_else(|| SmpError::Transport("peer endpoint closed".into()))
    }
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Run SMP as the initiator and return whether the secrets matched.
#[instrument(skip_all, fields(session = %Uuid::new_v4(), role = "initiator"))]
pub async fn run_initiator<T: SmpTransport + ?Sized>(
    transport: &mut T,
    secret: Secret,
    config: &SmpConfig,
) -> Result<bool> {
    config.validate()?;
    let mut machine = SmpStateMachine::new(secret);

    let msg1 = produced(machine.transit(None)?, TlvType::SmpMessage1)?;
    transport.send(msg1).await?;
    debug!("sent Message1");

    let msg2 = receive(transport, TlvType::SmpMessage2, config.proof_timeout()).await?;
    let msg3 = produced(machine.transit(Some(&msg2))?, TlvType::SmpMessage3)?;
    transport.send(msg3).await?;
    debug!("sent Message3");

    let msg4 = receive(transport, TlvType::SmpMessage4, config.message_timeout()).await?;
    machine.transit(Some(&msg4))?;

    let equal = machine.result()?;
    info!(equal, "initiator finished");
    Ok(equal)
}

/// Run SMP as the responder and return whether the secrets matched.
#[instrument(skip_all, fields(session = %Uuid::new_v4(), role = "responder"))]
pub async fn run_responder<T: SmpTransport + ?Sized>(
    transport: &mut T,
    secret: Secret,
    config: &SmpConfig,
) -> Result<bool> {
    config.validate()?;
    let mut machine = SmpStateMachine::new(secret);

    let msg1 = receive(transport, TlvType::SmpMessage1, config.message_timeout()).await?;
    let msg2 = produced(machine.transit(Some(&msg1))?, TlvType::SmpMessage2)?;
    transport.send(msg2).await?;
    debug!("sent Message2");

    let msg3 = receive(transport, TlvType::SmpMessage3, config.proof_timeout()).await?;
    let msg4 = produced(machine.transit(Some(&msg3))?, TlvType::SmpMessage4)?;
    transport.send(msg4).await?;
    debug!("sent Message4");

    let equal = machine.result()?;
    info!(equal, "responder finished");
    Ok(equal)
}

async fn receive<T: SmpTransport + ?Sized>(
    transport: &mut T,
    waiting_for: TlvType,
    limit: Duration,
) -> Result<Vec<u8>> {
    match timeout(limit, transport.recv()).await {
        Ok(frame) => frame,
        Err(_) => {
            warn!(%waiting_for, timeout_ms = limit.as_millis() as u64, "peer timed out");
            Err(SmpError::Timeout {
                waiting_for: waiting_for.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })
        }
    }
}

fn produced(frame: Option<Vec<u8>>, expected: TlvType) -> Result<Vec<u8>> {
    frame.ok_or_else(|| SmpError::UnexpectedMessage {
        phase: "driver".into(),
        message: format!("state machine produced no {expected}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_pair(x: Secret, y: Secret) -> (Result<bool>, Result<bool>) {
        let (mut alice, bob) = ChannelTransport::pair(4);
        let config = SmpConfig::default();
        let responder = tokio::spawn(async move {
            let mut bob = bob;
            run_responder(&mut bob, y, &SmpConfig::default()).await
        });
        let initiator = run_initiator(&mut alice, x, &config).await;
        (initiator, responder.await.unwrap())
    }

    #[tokio::test]
    async fn matching_secrets_over_channels() {
        let (a, b) = run_pair("string0".into(), "string0".into()).await;
        assert!(a.unwrap());
        assert!(b.unwrap());
    }

    #[tokio::test]
    async fn differing_secrets_over_channels() {
        let (a, b) = run_pair("string0".into(), "string1".into()).await;
        assert!(!a.unwrap());
        assert!(!b.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_peer_times_out() {
        let (mut alice, _bob) = ChannelTransport::pair(4);
        let config = SmpConfig {
            message_timeout_ms: 50,
            proof_timeout_ms: 100,
        };
        let err = run_initiator(&mut alice, 1u64.into(), &config)
            .await
            .unwrap_err();
        match err {
            SmpError::Timeout {
                waiting_for,
                timeout_ms,
            } => {
                assert_eq!(waiting_for, "SMPMessage2");
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_peer_is_a_transport_error() {
        let (mut bob, alice) = ChannelTransport::pair(4);
        drop(alice);
        let err = run_responder(&mut bob, 1u64.into(), &SmpConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SmpError::Transport(_)));
    }

    #[tokio::test]
    async fn zero_timeouts_are_rejected() {
        let (mut alice, _bob) = ChannelTransport::pair(1);
        let config = SmpConfig {
            message_timeout_ms: 0,
            proof_timeout_ms: 0,
        };
        let err = run_initiator(&mut alice, 1u64.into(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, SmpError::Range(_)));
    }

    #[tokio::test]
    async fn garbage_from_peer_fails_the_run() {
        let (mut alice, mut bob) = ChannelTransport::pair(4);
        let responder = tokio::spawn(async move {
            // Swallow Message1, answer with a frame of the wrong type.
            let _ = bob.recv().await;
            bob.send(vec![0, 5, 0, 0]).await
        });
        let err = run_initiator(&mut alice, 9u64.into(), &SmpConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SmpError::Format(_)));
        responder.await.unwrap().unwrap();
    }
}
