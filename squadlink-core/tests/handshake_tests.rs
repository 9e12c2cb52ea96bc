//! Tests for handshake

mod common;

use common::*;
use squadlink_core::handshake::{Handshake, HandshakeError, HandshakeState};
use squadlink_core::network::{MockRemote, MockTransport, NetworkError, Session, TransportConfig};

fn session_with(replies: &[String]) -> (Session<MockTransport>, MockRemote) {
    init_tracing();
    let mut transport = MockTransport::new();
    for reply in replies {
        transport.queue_receive(reply);
    }
    let remote = transport.remote();
    let session = Session::connect(transport, &TransportConfig::default()).unwrap();
    (session, remote)
}

fn handshake() -> Handshake {
    Handshake::new("eu1.pvp.net", "RC-SQUADLINK")
}

#[test]
fn test_successful_handshake_binds_user() {
    let (mut session, remote) = session_with(&handshake_replies());
    let mut handshake = handshake();

    let user = handshake.run(&mut session, &test_auth()).unwrap();

    assert_eq!(handshake.state(), HandshakeState::Bound);
    assert_eq!(user.name, "Sova");
    assert_eq!(user.tag, "EUW");
    assert_eq!(user.display_name(), "Sova#EUW");
    assert_eq!(user.address, USER_ADDRESS);

    let sent = remote.sent_messages();
    assert_eq!(sent.len(), 7);
    assert!(sent[0].starts_with("<?xml"));
    assert!(sent[0].contains("to=\"eu1.pvp.net\""));
    assert!(sent[1].contains("X-Riot-RSO-PAS"));
    assert!(sent[1].contains("access-token"));
    assert!(sent[1].contains("presence-token"));
    assert!(sent[2].starts_with("<?xml"));
    assert!(sent[3].contains("RC-SQUADLINK"));
    assert!(sent[4].contains("entitlements-token"));
    assert!(sent[5].contains("set_rxep_1"));
    assert!(sent[6].contains("_xmpp_session1"));
}

#[test]
fn test_auth_failure_stops_before_bind() {
    let mut replies = handshake_replies();
    replies[1] = "<failure xmlns='urn:ietf:params:xml:ns:xmpp-sasl'><not-authorized/></failure>".into();
    let (mut session, remote) = session_with(&replies);
    let mut handshake = handshake();

    let err = handshake.run(&mut session, &test_auth()).unwrap_err();

    assert_eq!(handshake.state(), HandshakeState::Failed);
    assert_eq!(err, HandshakeError::Rejected(Some("not-authorized".into())));

    let sent = remote.sent_messages();
    assert_eq!(sent.len(), 2);
    assert!(!sent.iter().any(|s| s.contains("_xmpp_bind1")));
    assert!(!sent.iter().any(|s| s.contains("_xmpp_session1")));
}

#[test]
fn test_stream_closed_mid_handshake() {
    let replies = handshake_replies();
    let (mut session, remote) = session_with(&replies[..3]);
    remote.close();
    let mut handshake = handshake();

    let err = handshake.run(&mut session, &test_auth()).unwrap_err();

    assert_eq!(err, HandshakeError::Network(NetworkError::ConnectionClosed));
    assert_eq!(handshake.state(), HandshakeState::Failed);
}

#[test]
fn test_session_reply_without_identity() {
    let mut replies = handshake_replies();
    replies[6] = "<iq id='_xmpp_session1' type='result'/>".into();
    let (mut session, _remote) = session_with(&replies);
    let mut handshake = handshake();

    let err = handshake.run(&mut session, &test_auth()).unwrap_err();
    assert!(matches!(err, HandshakeError::Protocol(_)));
}

#[test]
fn test_address_falls_back_to_session_reply() {
    let mut replies = handshake_replies();
    replies[3] = "<iq id='_xmpp_bind1' type='result'/>".into();
    let (mut session, _remote) = session_with(&replies);

    let user = handshake().run(&mut session, &test_auth()).unwrap();
    assert_eq!(user.address, USER_ADDRESS);
}

#[test]
fn test_run_twice_is_rejected() {
    let (mut session, _remote) = session_with(&handshake_replies());
    let mut handshake = handshake();
    handshake.run(&mut session, &test_auth()).unwrap();

    let err = handshake.run(&mut session, &test_auth()).unwrap_err();
    assert_eq!(err, HandshakeError::AlreadyFinished(HandshakeState::Bound));
}
