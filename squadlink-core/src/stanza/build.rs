// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbound stanza constructors.

use super::Element;
use crate::handshake::AuthResponse;

pub const NS_CLIENT: &str = "jabber:client";
pub const NS_STREAM: &str = "http://etherx.jabber.org/streams";
pub const NS_SASL: &str = "urn:ietf:params:xml:ns:xmpp-sasl";
pub const NS_BIND: &str = "urn:ietf:params:xml:ns:xmpp-bind";
pub const NS_SESSION: &str = "urn:ietf:params:xml:ns:xmpp-session";
pub const NS_ENTITLEMENTS: &str = "urn:riotgames:entitlements";
pub const NS_RXEP: &str = "urn:riotgames:rxep";
pub const NS_ROSTER: &str = "jabber:iq:riotgames:roster";

/// SASL mechanism carrying the access and presence-service tokens.
pub const AUTH_MECHANISM: &str = "X-Riot-RSO-PAS";

/// Game element under `<games>` that carries presence payloads.
pub const GAME_ELEMENT: &str = "valorant";

/// XML declaration plus stream opener. Sent at connect and again after auth.
pub fn stream_declaration(domain: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\
         <stream:stream to=\"{}\" xml:lang=\"en\" version=\"1.0\" xmlns=\"{}\" xmlns:stream=\"{}\">",
        quick_xml::escape::escape(domain),
        NS_CLIENT,
        NS_STREAM
    )
}

pub fn auth(response: &AuthResponse) -> Element {
    Element::new("auth")
        .with_attr("xmlns", NS_SASL)
        .with_attr("mechanism", AUTH_MECHANISM)
        .with_child(Element::new("rso_token").with_text(response.access_token.as_str()))
        .with_child(Element::new("pas_token").with_text(response.presence_token.as_str()))
}

fn iq_set(id: &str) -> Element {
    Element::new("iq").with_attr("id", id).with_attr("type", "set")
}

pub fn bind(resource: &str) -> Element {
    iq_set("_xmpp_bind1").with_child(
        Element::new("bind")
            .with_attr("xmlns", NS_BIND)
            .with_child(Element::new("puuid-mode").with_attr("enabled", "true"))
            .with_child(Element::new("resource").with_text(resource)),
    )
}

pub fn entitlements(response: &AuthResponse) -> Element {
    iq_set("xmpp_entitlements_0").with_child(
        Element::new("entitlements")
            .with_attr("xmlns", NS_ENTITLEMENTS)
            .with_child(Element::new("token").with_text(response.entitlements_token.as_str())),
    )
}

/// Opts in to last-online-state reporting. The payload is markup carried as
/// escaped text, not a child element.
pub fn capabilities() -> Element {
    iq_set("set_rxep_1").with_child(
        Element::new("rxcep")
            .with_attr("xmlns", NS_RXEP)
            .with_text("<last-online-state enabled='true' />"),
    )
}

pub fn session() -> Element {
    iq_set("_xmpp_session1").with_child(Element::new("session").with_attr("xmlns", NS_SESSION))
}

pub fn roster_query() -> Element {
    Element::new("iq")
        .with_attr("type", "get")
        .with_child(Element::new("query").with_attr("xmlns", NS_ROSTER))
}

fn roster_set(id: &str, item: Element) -> Element {
    Element::new("iq")
        .with_attr("type", "set")
        .with_attr("id", id)
        .with_child(
            Element::new("query")
                .with_attr("xmlns", NS_ROSTER)
                .with_child(item),
        )
}

/// Friend request by stable player id. Also used to accept an incoming one.
pub fn roster_add_by_player_id(player_id: &str) -> Element {
    roster_set(
        "roster_add_10",
        Element::new("item")
            .with_attr("subscription", "pending_out")
            .with_attr("puuid", player_id),
    )
}

pub fn roster_add_by_name(name: &str, tag: &str) -> Element {
    roster_set(
        "roster_add_10",
        Element::new("item")
            .with_attr("subscription", "pending_out")
            .with_child(
                Element::new("id")
                    .with_attr("name", name)
                    .with_attr("tagline", tag),
            ),
    )
}

/// Removes a friend or declines/cancels a pending request.
pub fn roster_remove(address: &str) -> Element {
    roster_set(
        "roster_remove_1",
        Element::new("item")
            .with_attr("jid", address)
            .with_attr("subscription", "remove"),
    )
}

pub fn chat_message(id: &str, to: &str, body: &str) -> Element {
    Element::new("message")
        .with_attr("id", id)
        .with_attr("to", to)
        .with_attr("type", "chat")
        .with_child(Element::new("body").with_text(body))
}

/// Presence carrying an encoded payload. Broadcast when `to` is `None`.
pub fn presence(encoded: &str, to: Option<&str>) -> Element {
    let mut el = Element::new("presence").with_attr("id", "presence_1");
    if let Some(to) = to {
        el.set_attr("to", to);
    }
    el.with_child(Element::new("show").with_text("chat"))
        .with_child(Element::new("status"))
        .with_child(
            Element::new("games").with_child(
                Element::new(GAME_ELEMENT)
                    .with_child(Element::new("st").with_text("chat"))
                    .with_child(Element::new("p").with_text(encoded))
                    .with_child(Element::new("s.p").with_text(GAME_ELEMENT)),
            ),
        )
}
