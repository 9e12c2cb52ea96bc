// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types

use thiserror::Error;

/// Errors raised by the transport layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The host could not be reached or the TLS channel could not be set up.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// An operation needed an open connection.
    #[error("not connected")]
    NotConnected,

    /// Writing to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The peer closed the stream, or the reader thread went away.
    #[error("connection closed")]
    ConnectionClosed,
}
