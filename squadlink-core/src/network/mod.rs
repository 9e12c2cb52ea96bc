// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! Owns the encrypted socket and turns its byte stream into stanzas.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: raw writes plus a detachable blocking read half
//! - **TLS transport**: rustls over a blocking TCP socket
//! - **Mock transport**: scripted in-memory transport for tests
//! - **Session**: reader thread, stanza framing and the ordered stanza queue
//!
//! # Example
//!
//! ```ignore
//! use squadlink_core::network::{MockTransport, Session, TransportConfig};
//!
//! let mut transport = MockTransport::new();
//! transport.queue_receive("<stream:features/>");
//! let session = Session::connect(transport, &TransportConfig::default())?;
//! let (writer, queue) = session.into_parts();
//! let stanza = queue.recv()?;
//! ```

mod error;
mod mock;
mod session;
mod tls;
mod transport;

// Error types
pub use error::NetworkError;

// Transport abstraction
pub use transport::{
    ChunkReader, ConnectionState, Transport, TransportConfig, TransportResult, DEFAULT_CHAT_PORT,
    DEFAULT_READ_BUFFER_SIZE,
};

// TLS transport for production
pub use tls::TlsTransport;

// Mock transport for testing
pub use mock::{MockRemote, MockTransport};

// Session
pub use session::{Session, SessionWriter, StanzaQueue};
