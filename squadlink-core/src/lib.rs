// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Squadlink Core Library
//!
//! Client for the game's chat, friends and presence stream: stanza framing
//! over an encrypted socket, the fixed login handshake, and a live roster.

pub mod api;
pub mod handshake;
pub mod network;
pub mod presence;
pub mod roster;
pub mod stanza;

pub use api::{
    CallbackHandler, ChatClient, ChatConfig, ChatError, ChatEvent, ChatMessage, ChatRegion,
    ChatResult, EventDispatcher, EventHandler,
};
pub use handshake::{AuthResponse, Handshake, HandshakeError, HandshakeState, User};
pub use network::{
    ConnectionState, MockTransport, NetworkError, Session, TlsTransport, Transport,
    TransportConfig,
};
pub use presence::{Presence, PresenceError};
pub use roster::{Contact, FriendState, RelationshipChange, Roster, RosterEngine};
pub use stanza::{Element, Stanza, StanzaError, StanzaFramer};
