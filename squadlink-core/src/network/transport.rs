// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Byte-level abstraction over the encrypted chat socket. The session writes
//! whole stanzas through [`Transport::write_raw`] and hands the read half,
//! obtained once with [`Transport::take_reader`], to a background thread.

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Default size of the fixed read buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 2048;

/// Default chat port (direct TLS).
pub const DEFAULT_CHAT_PORT: u16 = 5223;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to any server.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// TLS established and ready.
    Connected,
}

/// Configuration for transport connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Chat server host name, also used as the TLS server name.
    pub host: String,
    /// Chat server port.
    pub port: u16,
    /// Size of each socket read handed to the framer.
    pub read_buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            host: String::new(),
            port: DEFAULT_CHAT_PORT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl TransportConfig {
    /// Creates a config for the given host and port.
    pub fn new(host: &str, port: u16) -> Self {
        TransportConfig {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }
}

/// Read half of a connected transport.
///
/// Owned by the session's reader thread. Reads block until data arrives;
/// there is no timeout.
pub trait ChunkReader: Send {
    /// Reads the next chunk of plaintext into `buf`.
    ///
    /// Returns `Ok(0)` once the peer has closed the stream. Chunks carry no
    /// alignment with stanza boundaries.
    fn read_chunk(&mut self, buf: &mut [u8]) -> TransportResult<usize>;
}

/// Transport trait for the chat socket.
///
/// Implementations must finish encryption inside [`Transport::connect`]; no
/// protocol data may be written before that returns successfully.
pub trait Transport: Send {
    /// Connects and establishes the encrypted channel.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Disconnects. Safe to call even if not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Writes raw bytes to the encrypted channel.
    fn write_raw(&mut self, bytes: &[u8]) -> TransportResult<()>;

    /// Detaches the read half. Can only be taken once per connection.
    fn take_reader(&mut self) -> TransportResult<Box<dyn ChunkReader>>;
}
