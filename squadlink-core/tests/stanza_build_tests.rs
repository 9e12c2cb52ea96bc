//! Tests for stanza::build

use squadlink_core::handshake::AuthResponse;
use squadlink_core::stanza::{build, Element};

fn auth() -> AuthResponse {
    AuthResponse {
        access_token: "a&b".into(),
        entitlements_token: "ent".into(),
        presence_token: "pas".into(),
        id_token: None,
    }
}

#[test]
fn test_stream_declaration() {
    let decl = build::stream_declaration("eu1.pvp.net");
    assert!(decl.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
    assert!(decl.ends_with(
        "<stream:stream to=\"eu1.pvp.net\" xml:lang=\"en\" version=\"1.0\" \
         xmlns=\"jabber:client\" xmlns:stream=\"http://etherx.jabber.org/streams\">"
    ));
}

#[test]
fn test_auth_escapes_tokens() {
    let text = build::auth(&auth()).to_string();
    assert!(text.contains("mechanism=\"X-Riot-RSO-PAS\""));
    assert!(text.contains("<rso_token>a&amp;b</rso_token>"));
    assert!(text.contains("<pas_token>pas</pas_token>"));
}

#[test]
fn test_capabilities_payload_is_escaped_once() {
    let text = build::capabilities().to_string();
    assert!(text.contains("&lt;last-online-state enabled='true' /&gt;"));
    assert!(!text.contains("&amp;"));
}

#[test]
fn test_bind_and_session_ids() {
    let bind = build::bind("RC-SQUADLINK");
    assert_eq!(bind.attr("id"), Some("_xmpp_bind1"));
    assert_eq!(
        bind.find(&["bind", "resource"]).unwrap().text(),
        "RC-SQUADLINK"
    );
    assert!(bind.find(&["bind", "puuid-mode"]).is_some());
    assert_eq!(build::session().attr("id"), Some("_xmpp_session1"));
    assert_eq!(
        build::entitlements(&auth()).find(&["entitlements", "token"]).unwrap().text(),
        "ent"
    );
}

#[test]
fn test_presence_shape() {
    let el = build::presence("eyJ9", Some("p1@eu1.pvp.net"));
    let reparsed = Element::parse(&el.to_string()).unwrap();

    assert_eq!(reparsed.attr("to"), Some("p1@eu1.pvp.net"));
    assert_eq!(reparsed.find(&["games", "valorant", "st"]).unwrap().text(), "chat");
    assert_eq!(reparsed.find(&["games", "valorant", "p"]).unwrap().text(), "eyJ9");
    assert_eq!(
        reparsed.find(&["games", "valorant", "s.p"]).unwrap().text(),
        "valorant"
    );
}

#[test]
fn test_chat_message_round_trips_markup() {
    let el = build::chat_message("1:1", "p1@eu1.pvp.net", "<b>\"hi\" & bye</b>");
    let reparsed = Element::parse(&el.to_string()).unwrap();
    assert_eq!(reparsed.child("body").unwrap().text(), "<b>\"hi\" & bye</b>");
}
