// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Handshake Controller
//!
//! Drives the fixed login sequence on a fresh session:
//!
//! ```text
//! AwaitConnect --stream decl--> WaitStreamOpen --auth--> WaitAuthResult
//!   --success, stream decl--> WaitBind --bind/entitlements/caps/session--> WaitSessionId
//!   --identity--> Bound
//! ```
//!
//! Every send waits for exactly one reply. There are no retries: any error
//! moves the controller to `Failed` and nothing more is sent.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::network::NetworkError;
use crate::stanza::{build, Element, Stanza};

/// Tokens obtained from the REST auth service before login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Account access token.
    pub access_token: String,
    /// Entitlements token.
    pub entitlements_token: String,
    /// Presence-service token.
    pub presence_token: String,
    /// Identity token, not used by the chat stream.
    #[serde(default)]
    pub id_token: Option<String>,
}

/// The account a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Display name
    pub name: String,
    /// Name tag
    pub tag: String,
    /// Full routing address bound to this session.
    pub address: String,
}

impl User {
    /// `name#tag`
    pub fn display_name(&self) -> String {
        format!("{}#{}", self.name, self.tag)
    }
}

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitConnect,
    WaitStreamOpen,
    WaitAuthResult,
    WaitBind,
    WaitSessionId,
    /// Terminal success.
    Bound,
    /// Terminal failure.
    Failed,
}

/// Why a handshake failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// The server answered the auth stanza without a success marker.
    #[error("authentication rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// The session broke during the handshake.
    #[error("network error during handshake: {0}")]
    Network(#[from] NetworkError),

    /// A reply lacked something the sequence needs.
    #[error("unexpected reply: {0}")]
    Protocol(String),

    /// `run` was called again.
    #[error("handshake already finished in state {0:?}")]
    AlreadyFinished(HandshakeState),
}

/// One-for-one request/reply channel used during the handshake.
///
/// Only valid while the exchange is strictly linear; steady-state traffic
/// does not follow this pattern.
pub trait StanzaExchange {
    /// Writes raw text.
    fn send_raw(&mut self, text: &str) -> Result<(), NetworkError>;

    /// Writes one element.
    fn send(&mut self, element: &Element) -> Result<(), NetworkError> {
        self.send_raw(&element.to_string())
    }

    /// Blocks for the next framed stanza.
    fn recv(&mut self) -> Result<Stanza, NetworkError>;
}

/// Login state machine.
#[derive(Debug)]
pub struct Handshake {
    state: HandshakeState,
    domain: String,
    resource: String,
}

impl Handshake {
    /// Creates a controller for the given stream domain and resource.
    pub fn new(domain: &str, resource: &str) -> Self {
        Handshake {
            state: HandshakeState::AwaitConnect,
            domain: domain.to_string(),
            resource: resource.to_string(),
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Runs the whole sequence. On error the state is `Failed`.
    pub fn run<E: StanzaExchange>(
        &mut self,
        io: &mut E,
        auth: &AuthResponse,
    ) -> Result<User, HandshakeError> {
        if self.state != HandshakeState::AwaitConnect {
            return Err(HandshakeError::AlreadyFinished(self.state));
        }

        match self.drive(io, auth) {
            Ok(user) => {
                self.state = HandshakeState::Bound;
                info!(user = %user.display_name(), "chat session bound");
                Ok(user)
            }
            Err(e) => {
                warn!(state = ?self.state, error = %e, "chat handshake failed");
                self.state = HandshakeState::Failed;
                Err(e)
            }
        }
    }

    fn drive<E: StanzaExchange>(
        &mut self,
        io: &mut E,
        auth: &AuthResponse,
    ) -> Result<User, HandshakeError> {
        io.send_raw(&build::stream_declaration(&self.domain))?;
        self.transition(HandshakeState::WaitStreamOpen);
        io.recv()?;

        io.send(&build::auth(auth))?;
        self.transition(HandshakeState::WaitAuthResult);
        let result = io.recv()?;
        if result.element().local_name() != "success" {
            return Err(HandshakeError::Rejected(failure_reason(result.element())));
        }

        // The stream restarts after SASL
        io.send_raw(&build::stream_declaration(&self.domain))?;
        io.recv()?;
        self.transition(HandshakeState::WaitBind);

        io.send(&build::bind(&self.resource))?;
        let bind_reply = io.recv()?;
        let bound_address = bind_reply
            .element()
            .find(&["bind", "jid"])
            .map(|jid| jid.text());

        io.send(&build::entitlements(auth))?;
        io.recv()?;
        io.send(&build::capabilities())?;
        io.recv()?;

        io.send(&build::session())?;
        self.transition(HandshakeState::WaitSessionId);
        let confirmation = io.recv()?;

        let id = confirmation
            .element()
            .find(&["session", "id"])
            .ok_or_else(|| HandshakeError::Protocol("session reply without identity".into()))?;

        let address = bound_address
            .filter(|jid| !jid.is_empty())
            .or_else(|| confirmation.element().attr("to").map(str::to_string))
            .ok_or_else(|| HandshakeError::Protocol("no routing address bound".into()))?;

        Ok(User {
            name: id.attr("name").unwrap_or_default().to_string(),
            tag: id.attr("tagline").unwrap_or_default().to_string(),
            address,
        })
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!(from = ?self.state, to = ?next, "handshake");
        self.state = next;
    }
}

/// Reason text from a SASL `<failure>`: its `<text>`, else the condition name.
fn failure_reason(el: &Element) -> Option<String> {
    if let Some(text) = el.child("text").map(Element::text) {
        if !text.is_empty() {
            return Some(text);
        }
    }
    el.children()
        .find(|c| c.local_name() != "text")
        .map(|c| c.local_name().to_string())
}
