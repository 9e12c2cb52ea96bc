//! Tests for presence

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use squadlink_core::presence::{Presence, PresenceError};

#[test]
fn test_default_presence_round_trip() {
    let presence = Presence::default();
    let encoded = presence.encode().unwrap();
    assert_eq!(Presence::decode(&encoded).unwrap(), presence);
}

#[test]
fn test_wire_field_names() {
    let encoded = Presence::default().encode().unwrap();
    let json = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
    assert!(json.contains("\"sessionLoopState\":\"MENUS\""));
    assert!(json.contains("\"partyLFM\":false"));
    assert!(json.contains("\"partyClientVersion\""));
    assert!(!json.contains("party_lfm"));
}

#[test]
fn test_partial_payload_takes_defaults() {
    let encoded = STANDARD.encode(r#"{"sessionLoopState":"INGAME","matchMap":"/Game/Maps/Ascent"}"#);
    let presence = Presence::decode(&encoded).unwrap();

    assert_eq!(presence.session_loop_state, "INGAME");
    assert_eq!(presence.match_map, "/Game/Maps/Ascent");
    assert!(presence.is_in_game());
    assert_eq!(presence.max_party_size, 5);
    assert_eq!(presence.queue_id, "unrated");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let encoded = STANDARD.encode(r#"{"isIdle":true,"someNewField":[1,2,3]}"#);
    let presence = Presence::decode(&encoded).unwrap();
    assert!(presence.is_idle);
}

#[test]
fn test_surrounding_whitespace_is_ignored() {
    let encoded = format!("\n  {}  \n", Presence::default().encode().unwrap());
    assert!(Presence::decode(&encoded).is_ok());
}

#[test]
fn test_invalid_base64() {
    let err = Presence::decode("not base64!!").unwrap_err();
    assert!(matches!(err, PresenceError::Base64(_)));
}

#[test]
fn test_invalid_utf8() {
    let err = Presence::decode(&STANDARD.encode([0xff, 0xfe, 0xfd])).unwrap_err();
    assert!(matches!(err, PresenceError::Utf8(_)));
}

#[test]
fn test_invalid_json() {
    let err = Presence::decode(&STANDARD.encode("42")).unwrap_err();
    assert!(matches!(err, PresenceError::Json(_)));
}

#[test]
fn test_menus_is_not_in_game() {
    assert!(!Presence::default().is_in_game());
}
