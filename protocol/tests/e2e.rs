//! End-to-end integration tests for the SMP engine.
//!
//! These tests only touch the public API: two state machines exchanging
//! raw frames, frames tampered with between them, and the async drivers
//! over in-memory channels.
//!
//! Each test builds its own parties from its own seed. No shared state.

use ark_ed_on_bn254::Fr;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use num_bigint::BigUint;

use blindfind_protocol::crypto::curve::{exponentiate_generator, to_affine};
use blindfind_protocol::smp::{
    run_initiator, run_responder, AnyMessage, ChannelTransport, SmpMessage,
};
use blindfind_protocol::wire::{Byte, Scalar, Tlv, TlvType, VarInt, WireField};
use blindfind_protocol::{PhaseKind, Secret, SmpConfig, SmpError, SmpStateMachine};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Frames of one completed run, in order.
struct Transcript {
    alice: SmpStateMachine,
    bob: SmpStateMachine,
    frames: Vec<Vec<u8>>,
}

fn run(x: Secret, y: Secret, seed: u64) -> Transcript {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut alice = SmpStateMachine::new(x);
    let mut bob = SmpStateMachine::new(y);

    let msg1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    let msg2 = bob.transit_with_rng(Some(&msg1), &mut rng).unwrap().unwrap();
    let msg3 = alice.transit_with_rng(Some(&msg2), &mut rng).unwrap().unwrap();
    let msg4 = bob.transit_with_rng(Some(&msg3), &mut rng).unwrap().unwrap();
    assert_eq!(alice.transit_with_rng(Some(&msg4), &mut rng).unwrap(), None);

    Transcript {
        alice,
        bob,
        frames: vec![msg1, msg2, msg3, msg4],
    }
}

fn results(t: &Transcript) -> (bool, bool) {
    (t.alice.result().unwrap(), t.bob.result().unwrap())
}

// ---------------------------------------------------------------------------
// Correctness
// ---------------------------------------------------------------------------

#[test]
fn full_run_equal_strings() {
    let t = run("string0".into(), "string0".into(), 1);
    assert_eq!(results(&t), (true, true));
}

#[test]
fn full_run_different_strings() {
    let t = run("string0".into(), "string1".into(), 2);
    assert_eq!(results(&t), (false, false));
}

#[test]
fn full_run_agrees_on_many_pairs() {
    let pairs: [(u64, u64); 6] = [(0, 0), (0, 1), (1, 1), (7, 8), (u64::MAX, u64::MAX), (5, 5)];
    for (i, (x, y)) in pairs.into_iter().enumerate() {
        let t = run(x.into(), y.into(), 100 + i as u64);
        assert_eq!(results(&t), (x == y, x == y), "pair {x}, {y}");
    }
}

#[test]
fn full_run_with_big_and_byte_secrets() {
    let big = BigUint::from(1u8) << 300u32;
    let t = run(big.clone().into(), big.into(), 3);
    assert_eq!(results(&t), (true, true));

    let t = run(b"\x00\x01".to_vec().into(), b"\x00\x02".to_vec().into(), 4);
    assert_eq!(results(&t), (false, false));
}

#[test]
fn secrets_equal_mod_group_order_compare_equal() {
    let l: BigUint = blindfind_protocol::crypto::group_order();
    let t = run(Secret::Big(l + 3u8), Secret::Integer(3), 5);
    assert_eq!(results(&t), (true, true));
}

#[test]
fn same_secrets_produce_fresh_transcripts() {
    let a = run("same".into(), "same".into(), 6);
    let b = run("same".into(), "same".into(), 7);
    for (fa, fb) in a.frames.iter().zip(&b.frames) {
        assert_ne!(fa, fb);
    }
}

#[test]
fn transcript_parses_into_expected_types() {
    let t = run(1u64.into(), 1u64.into(), 8);
    let kinds: Vec<TlvType> = t
        .frames
        .iter()
        .map(|f| AnyMessage::from_bytes(f).unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            TlvType::SmpMessage1,
            TlvType::SmpMessage2,
            TlvType::SmpMessage3,
            TlvType::SmpMessage4
        ]
    );
    // Headers: tag then payload length.
    assert_eq!(&t.frames[0][..4], &[0x00, 0x02, 0x00, 0xC0]);
    assert_eq!(&t.frames[1][..4], &[0x00, 0x03, 0x01, 0x60]);
    assert_eq!(&t.frames[2][..4], &[0x00, 0x04, 0x01, 0x00]);
    assert_eq!(&t.frames[3][..4], &[0x00, 0x05, 0x00, 0x60]);
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[test]
fn every_phase_rejects_wrong_message_types() {
    let t = run("p".into(), "p".into(), 9);
    let mut rng = StdRng::seed_from_u64(10);

    // Initial accepts only the trigger or Message1.
    for frame in &t.frames[1..] {
        let mut fresh = SmpStateMachine::new("p");
        assert!(matches!(
            fresh.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::UnexpectedMessage { .. })
        ));
        assert_eq!(fresh.phase(), PhaseKind::Initial);
    }

    // AwaitingMsg2 accepts only Message2.
    let mut alice = SmpStateMachine::new("p");
    alice.transit_with_rng(None, &mut rng).unwrap();
    for i in [0usize, 2, 3] {
        assert!(matches!(
            alice.transit_with_rng(Some(&t.frames[i]), &mut rng),
            Err(SmpError::UnexpectedMessage { .. })
        ));
        assert_eq!(alice.phase(), PhaseKind::AwaitingMsg2);
    }

    // AwaitingMsg3 accepts only Message3.
    let mut bob = SmpStateMachine::new("p");
    bob.transit_with_rng(Some(&t.frames[0]), &mut rng).unwrap();
    for i in [0usize, 1, 3] {
        assert!(matches!(
            bob.transit_with_rng(Some(&t.frames[i]), &mut rng),
            Err(SmpError::UnexpectedMessage { .. })
        ));
        assert_eq!(bob.phase(), PhaseKind::AwaitingMsg3);
    }
    assert!(matches!(
        bob.transit_with_rng(None, &mut rng),
        Err(SmpError::UnexpectedMessage { .. })
    ));

    // AwaitingMsg4 accepts only Message4.
    let mut alice = SmpStateMachine::new("p");
    let mut peer = SmpStateMachine::new("p");
    let msg1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    let msg2 = peer.transit_with_rng(Some(&msg1), &mut rng).unwrap().unwrap();
    alice.transit_with_rng(Some(&msg2), &mut rng).unwrap();
    assert_eq!(alice.phase(), PhaseKind::AwaitingMsg4);
    for i in [0usize, 1, 2] {
        assert!(matches!(
            alice.transit_with_rng(Some(&t.frames[i]), &mut rng),
            Err(SmpError::UnexpectedMessage { .. })
        ));
        assert_eq!(alice.phase(), PhaseKind::AwaitingMsg4);
    }
    assert!(matches!(
        alice.transit_with_rng(None, &mut rng),
        Err(SmpError::UnexpectedMessage { .. })
    ));
    assert_eq!(alice.phase(), PhaseKind::AwaitingMsg4);
}

#[test]
fn every_phase_rejects_unparseable_frames() {
    let garbage: [&[u8]; 4] = [&[], &[0x00], &[0x00, 0x07, 0x00, 0x00], &[0x00, 0x02, 0x00, 0x10]];
    let mut rng = StdRng::seed_from_u64(11);
    let mut alice = SmpStateMachine::new(1u64);
    let mut bob = SmpStateMachine::new(1u64);

    let msg1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    bob.transit_with_rng(Some(&msg1), &mut rng).unwrap();

    for frame in garbage {
        assert!(matches!(
            alice.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::Format(_))
        ));
        assert!(matches!(
            bob.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::Format(_))
        ));
    }
    assert_eq!(alice.phase(), PhaseKind::AwaitingMsg2);
    assert_eq!(bob.phase(), PhaseKind::AwaitingMsg3);

    // Initial.
    let mut fresh = SmpStateMachine::new(1u64);
    for frame in garbage {
        assert!(matches!(
            fresh.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::Format(_))
        ));
    }
    assert_eq!(fresh.phase(), PhaseKind::Initial);

    // AwaitingMsg4, including a Message4 header with a short payload.
    let mut alice = SmpStateMachine::new(1u64);
    let mut bob = SmpStateMachine::new(1u64);
    let m1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    let m2 = bob.transit_with_rng(Some(&m1), &mut rng).unwrap().unwrap();
    let m3 = alice.transit_with_rng(Some(&m2), &mut rng).unwrap().unwrap();
    let short_message4: [&[u8]; 2] = [&[0x00, 0x05, 0x00, 0x01], &[0x00, 0x05, 0x00, 0x00]];
    for frame in garbage.into_iter().chain(short_message4) {
        assert!(matches!(
            alice.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::Format(_))
        ));
        assert_eq!(alice.phase(), PhaseKind::AwaitingMsg4);
    }

    // Finished keeps its result through garbage.
    let m4 = bob.transit_with_rng(Some(&m3), &mut rng).unwrap().unwrap();
    assert_eq!(bob.phase(), PhaseKind::Finished);
    for frame in garbage {
        assert!(matches!(
            bob.transit_with_rng(Some(frame), &mut rng),
            Err(SmpError::Format(_))
        ));
        assert_eq!(bob.phase(), PhaseKind::Finished);
    }
    assert!(bob.result().unwrap());

    // The rejected frames did not disturb the initiator's run.
    assert_eq!(alice.transit_with_rng(Some(&m4), &mut rng).unwrap(), None);
    assert!(alice.result().unwrap());
}

#[test]
fn tampered_message2_aborts_initiator() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut alice = SmpStateMachine::new("k");
    let mut bob = SmpStateMachine::new("k");
    let msg1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    let msg2 = bob.transit_with_rng(Some(&msg1), &mut rng).unwrap().unwrap();

    let mut parsed = match AnyMessage::from_bytes(&msg2).unwrap() {
        AnyMessage::Message2(m) => m,
        other => panic!("expected Message2, got {}", other.kind()),
    };
    // Swap Qb for another subgroup point; the PQ proof no longer holds.
    parsed.qb = to_affine(&exponentiate_generator(&Fr::from(99u64)));
    let forged = parsed.serialize().unwrap();

    assert!(matches!(
        alice.transit_with_rng(Some(&forged), &mut rng),
        Err(SmpError::VerificationFailed(_))
    ));
    assert_eq!(alice.phase(), PhaseKind::Aborted);
    assert!(matches!(
        alice.transit_with_rng(Some(&msg2), &mut rng),
        Err(SmpError::Aborted)
    ));
}

#[test]
fn tampered_message4_aborts_initiator() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut alice = SmpStateMachine::new("k");
    let mut bob = SmpStateMachine::new("k");
    let msg1 = alice.transit_with_rng(None, &mut rng).unwrap().unwrap();
    let msg2 = bob.transit_with_rng(Some(&msg1), &mut rng).unwrap().unwrap();
    let msg3 = alice.transit_with_rng(Some(&msg2), &mut rng).unwrap().unwrap();
    let msg4 = bob.transit_with_rng(Some(&msg3), &mut rng).unwrap().unwrap();

    let mut parsed = match AnyMessage::from_bytes(&msg4).unwrap() {
        AnyMessage::Message4(m) => m,
        other => panic!("expected Message4, got {}", other.kind()),
    };
    parsed.rb_proof.c = Scalar::from(parsed.rb_proof.c.to_field() + Fr::from(1u64));
    let forged = parsed.serialize().unwrap();

    assert!(matches!(
        alice.transit_with_rng(Some(&forged), &mut rng),
        Err(SmpError::VerificationFailed(_))
    ));
    assert!(matches!(alice.result(), Err(SmpError::Aborted)));
    // Bob finished before the tampering and keeps his result.
    assert!(bob.result().unwrap());
}

#[test]
fn result_before_finish_fails() {
    let machine = SmpStateMachine::new("early");
    assert!(matches!(machine.result(), Err(SmpError::NotFinished)));
    assert!(!machine.is_finished());
}

// ---------------------------------------------------------------------------
// Wire
// ---------------------------------------------------------------------------

#[test]
fn primitive_vectors() {
    assert_eq!(Byte::try_from(255i128).unwrap().encode(), vec![0xFF]);
    assert!(Byte::try_from(256i128).is_err());
    assert_eq!(VarInt::from(0u64).encode(), vec![0, 0, 0, 1, 0]);
    assert_eq!(VarInt::from(256u64).encode(), vec![0, 0, 0, 2, 1, 0]);

    let two_256 = BigUint::from(1u8) << 256u32;
    assert!(matches!(
        Scalar::try_from(two_256.clone()),
        Err(SmpError::Range(_))
    ));
    assert_eq!(
        Scalar::try_from(two_256 - 1u8).unwrap(),
        Scalar::MAX
    );
}

#[test]
fn frame_round_trips_through_tlv() {
    let t = run(2u64.into(), 2u64.into(), 14);
    for frame in &t.frames {
        let tlv = Tlv::deserialize(frame).unwrap();
        assert_eq!(&tlv.serialize(), frame);
    }
}

#[test]
fn point_frame_vector_from_hex() {
    // Rb = Base8, cR = 2, d7 = 3.
    let rb = to_affine(&exponentiate_generator(&Fr::from(1u64)));
    let payload = [
        rb.encode(),
        Scalar::from(Fr::from(2u64)).encode(),
        Scalar::from(Fr::from(3u64)).encode(),
    ]
    .concat();
    let frame = Tlv::new(TlvType::SmpMessage4, payload).unwrap().serialize();
    let expected = hex::decode(concat!(
        "00050060",
        "8b7d2d877a253c4b7733e1b91f05e0fcedf96bd11c2e572549b2a0f703727925",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000003",
    ))
    .unwrap();
    assert_eq!(frame, expected);
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drivers_over_channels_equal() {
    let (mut alice, mut bob) = ChannelTransport::pair(4);
    let config = SmpConfig::default();
    let responder = tokio::spawn(async move {
        run_responder(&mut bob, Secret::from("shared"), &SmpConfig::default()).await
    });
    let a = run_initiator(&mut alice, Secret::from("shared"), &config)
        .await
        .unwrap();
    let b = responder.await.unwrap().unwrap();
    assert!(a && b);
}

#[tokio::test]
async fn drivers_over_channels_unequal() {
    let (mut alice, mut bob) = ChannelTransport::pair(4);
    let config = SmpConfig::from_json(r#"{"message_timeout_ms": 5000}"#).unwrap();
    let responder =
        tokio::spawn(async move { run_responder(&mut bob, Secret::from(1u64), &config).await });
    let a = run_initiator(&mut alice, Secret::from(2u64), &SmpConfig::default())
        .await
        .unwrap();
    let b = responder.await.unwrap().unwrap();
    assert!(!a && !b);
}
