// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the chat API layer.

use thiserror::Error;

use crate::handshake::HandshakeError;
use crate::network::NetworkError;
use crate::presence::PresenceError;

/// Longest chat message the server accepts.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Unified error type for chat operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Transport failure. Fatal to the session.
    #[error("connection error: {0}")]
    Connection(#[from] NetworkError),

    /// The login handshake was rejected or broke off. Fatal.
    #[error("auth error: {reason}")]
    Auth {
        /// Server reason text when it sent one, otherwise a generic message.
        reason: String,
    },

    /// A presence payload could not be decoded or encoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Our own presence could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// An event handler panicked. Logged and recovered.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Invalid operation in current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Outbound message over the length limit.
    #[error("message too long: {length} characters (max {})", MAX_MESSAGE_LENGTH)]
    MessageTooLong {
        /// Length of the rejected message in characters.
        length: usize,
    },
}

/// Generic reason used when the server gave none.
pub const AUTH_FAILED: &str = "failed to authenticate the chat session";

impl From<HandshakeError> for ChatError {
    fn from(err: HandshakeError) -> Self {
        let reason = match err {
            HandshakeError::Rejected(Some(reason)) => reason,
            _ => AUTH_FAILED.to_string(),
        };
        ChatError::Auth { reason }
    }
}

impl From<PresenceError> for ChatError {
    fn from(err: PresenceError) -> Self {
        ChatError::Decode(err.to_string())
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
