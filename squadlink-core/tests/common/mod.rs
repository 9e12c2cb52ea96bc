// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Scripted server replies, roster fixtures and event collection shared
//! across test modules.

#![allow(dead_code)]

pub mod strategies;

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use squadlink_core::api::{CallbackHandler, ChatEvent, EventHandler};
use squadlink_core::handshake::AuthResponse;
use squadlink_core::presence::Presence;

/// How long tests wait for an event from the consumer thread.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub const USER_ADDRESS: &str = "self-puuid@eu1.pvp.net/RC-SQUADLINK";

/// Routes library logs to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_auth() -> AuthResponse {
    AuthResponse {
        access_token: "access-token".into(),
        entitlements_token: "entitlements-token".into(),
        presence_token: "presence-token".into(),
        id_token: None,
    }
}

/// Server side of a successful handshake, one entry per expected reply.
pub fn handshake_replies() -> Vec<String> {
    vec![
        "<?xml version='1.0'?><stream:stream xmlns='jabber:client' \
         xmlns:stream='http://etherx.jabber.org/streams' version='1.0' from='eu1.pvp.net'>\
         <stream:features><mechanisms xmlns='urn:ietf:params:xml:ns:xmpp-sasl'>\
         <mechanism>X-Riot-RSO-PAS</mechanism></mechanisms></stream:features>"
            .into(),
        "<success xmlns='urn:ietf:params:xml:ns:xmpp-sasl'/>".into(),
        "<?xml version='1.0'?><stream:stream xmlns='jabber:client' \
         xmlns:stream='http://etherx.jabber.org/streams' version='1.0' from='eu1.pvp.net'>\
         <stream:features><bind xmlns='urn:ietf:params:xml:ns:xmpp-bind'/>\
         <session xmlns='urn:ietf:params:xml:ns:xmpp-session'/></stream:features>"
            .into(),
        format!(
            "<iq id='_xmpp_bind1' type='result'><bind xmlns='urn:ietf:params:xml:ns:xmpp-bind'>\
             <jid>{}</jid></bind></iq>",
            USER_ADDRESS
        ),
        "<iq id='xmpp_entitlements_0' type='result'/>".into(),
        "<iq id='set_rxep_1' type='result'/>".into(),
        format!(
            "<iq id='_xmpp_session1' type='result' to='{}'>\
             <session xmlns='urn:ietf:params:xml:ns:xmpp-session'>\
             <id name='Sova' tagline='EUW'/></session></iq>",
            USER_ADDRESS
        ),
    ]
}

/// One roster `<item>`.
pub fn roster_item(player_id: &str, name: &str, tag: &str, subscription: &str) -> String {
    format!(
        "<item jid='{}' puuid='{}' subscription='{}'><id name='{}' tagline='{}'/></item>",
        address_of(player_id),
        player_id,
        subscription,
        name,
        tag
    )
}

/// Reply to the initial roster query.
pub fn roster_reply(items: &[String]) -> String {
    format!(
        "<iq id='roster_1' type='result'><query xmlns='jabber:iq:riotgames:roster'>{}</query></iq>",
        items.concat()
    )
}

/// A steady-state roster push.
pub fn roster_push(item: &str) -> String {
    format!(
        "<iq type='set' id='push_1'><query xmlns='jabber:iq:riotgames:roster'>{}</query></iq>",
        item
    )
}

/// Presence stanza from a player, with an encoded payload when given.
pub fn presence_from(player_id: &str, payload: Option<&Presence>) -> String {
    let address = address_of(player_id);
    match payload {
        Some(presence) => format!(
            "<presence from='{}/RC-1'><games><valorant><st>chat</st><p>{}</p></valorant></games></presence>",
            address,
            presence.encode().expect("encode presence")
        ),
        None => format!("<presence from='{}/RC-1' type='unavailable'/>", address),
    }
}

pub fn address_of(player_id: &str) -> String {
    format!("{}@eu1.pvp.net", player_id)
}

/// Registers a handler that forwards every event to a channel.
pub fn channel_handler() -> (Arc<dyn EventHandler>, Receiver<ChatEvent>) {
    let (tx, rx) = mpsc::channel();
    let tx = std::sync::Mutex::new(tx);
    let handler = CallbackHandler::new(move |event| {
        let _ = tx.lock().unwrap().send(event);
    });
    (Arc::new(handler), rx)
}

/// Waits for the next event or panics after [`EVENT_TIMEOUT`].
pub fn next_event(rx: &Receiver<ChatEvent>) -> ChatEvent {
    rx.recv_timeout(EVENT_TIMEOUT).expect("event within timeout")
}
