// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TLS Transport
//!
//! Real transport implementation: a rustls client session over a blocking
//! `TcpStream`. The read and write halves share the TLS state behind a
//! mutex; the reader only takes the lock after the socket has produced
//! bytes, so a blocked read never stalls outbound stanzas.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex, MutexGuard};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use tracing::debug;

use super::error::NetworkError;
use super::transport::{ChunkReader, ConnectionState, Transport, TransportConfig, TransportResult};

/// Size of the raw ciphertext buffer used by the reader.
const TLS_READ_BUFFER_SIZE: usize = 4096;

type SharedConnection = Arc<Mutex<ClientConnection>>;

/// TLS transport for the chat service.
///
/// # Example
///
/// ```ignore
/// use squadlink_core::network::{TlsTransport, Transport, TransportConfig};
///
/// let mut transport = TlsTransport::new();
/// transport.connect(&TransportConfig::new("na2.chat.si.riotgames.com", 5223))?;
/// ```
pub struct TlsTransport {
    socket: Option<TcpStream>,
    tls: Option<SharedConnection>,
    reader_taken: bool,
    state: ConnectionState,
}

impl TlsTransport {
    /// Creates a new, disconnected TLS transport.
    pub fn new() -> Self {
        TlsTransport {
            socket: None,
            tls: None,
            reader_taken: false,
            state: ConnectionState::Disconnected,
        }
    }

    fn client_config() -> Arc<ClientConfig> {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        Arc::new(config)
    }

    /// Runs the TLS handshake to completion on the blocking socket.
    fn establish(host: &str, socket: &TcpStream) -> Result<ClientConnection, NetworkError> {
        let server_name: ServerName<'static> = ServerName::try_from(host.to_string())
            .map_err(|_| NetworkError::ConnectionFailed(format!("Invalid server name: {}", host)))?;

        let mut conn = ClientConnection::new(Self::client_config(), server_name)
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let mut io = socket;
        while conn.is_handshaking() {
            conn.complete_io(&mut io).map_err(|e| {
                NetworkError::ConnectionFailed(format!("TLS handshake failed: {}", e))
            })?;
        }

        Ok(conn)
    }

    fn fail_connect(&mut self, err: NetworkError) -> NetworkError {
        self.state = ConnectionState::Disconnected;
        err
    }
}

impl Default for TlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TlsTransport {
    fn drop(&mut self) {
        // Shutting the socket down also ends the detached reader's clone
        let _ = self.disconnect();
    }
}

fn lock(tls: &SharedConnection) -> MutexGuard<'_, ClientConnection> {
    tls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pushes any queued TLS records (data, alerts, key updates) to the socket.
fn flush_tls(conn: &mut ClientConnection, socket: &TcpStream) -> std::io::Result<()> {
    let mut io = socket;
    while conn.wants_write() {
        conn.write_tls(&mut io)?;
    }
    io.flush()
}

impl Transport for TlsTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        debug!(host = %config.host, port = config.port, "opening chat socket");

        let socket = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|e| self.fail_connect(NetworkError::ConnectionFailed(e.to_string())))?;
        socket
            .set_nodelay(true)
            .map_err(|e| self.fail_connect(NetworkError::ConnectionFailed(e.to_string())))?;

        let conn = Self::establish(&config.host, &socket).map_err(|e| self.fail_connect(e))?;

        debug!(host = %config.host, "TLS established");
        self.socket = Some(socket);
        self.tls = Some(Arc::new(Mutex::new(conn)));
        self.reader_taken = false;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        if let (Some(tls), Some(socket)) = (self.tls.take(), self.socket.take()) {
            let mut conn = lock(&tls);
            conn.send_close_notify();
            let _ = flush_tls(&mut conn, &socket); // Best effort on close
            let _ = socket.shutdown(std::net::Shutdown::Both);
        }
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn write_raw(&mut self, bytes: &[u8]) -> TransportResult<()> {
        let (tls, socket) = match (&self.tls, &self.socket) {
            (Some(tls), Some(socket)) => (tls, socket),
            _ => return Err(NetworkError::NotConnected),
        };

        let result = {
            let mut conn = lock(tls);
            let written = conn.writer().write_all(bytes);
            written.and_then(|()| flush_tls(&mut conn, socket))
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::BrokenPipe | ErrorKind::ConnectionReset) => {
                self.state = ConnectionState::Disconnected;
                Err(NetworkError::ConnectionClosed)
            }
            Err(e) => Err(NetworkError::SendFailed(e.to_string())),
        }
    }

    fn take_reader(&mut self) -> TransportResult<Box<dyn ChunkReader>> {
        let (tls, socket) = match (&self.tls, &self.socket) {
            (Some(tls), Some(socket)) => (tls, socket),
            _ => return Err(NetworkError::NotConnected),
        };
        if self.reader_taken {
            return Err(NetworkError::ReceiveFailed("reader already taken".into()));
        }

        let socket = socket
            .try_clone()
            .map_err(|e| NetworkError::ReceiveFailed(e.to_string()))?;
        self.reader_taken = true;

        Ok(Box::new(TlsReader {
            socket,
            tls: Arc::clone(tls),
            ciphertext: vec![0u8; TLS_READ_BUFFER_SIZE],
        }))
    }
}

/// Read half of a [`TlsTransport`].
struct TlsReader {
    socket: TcpStream,
    tls: SharedConnection,
    ciphertext: Vec<u8>,
}

impl ChunkReader for TlsReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        loop {
            {
                let mut conn = lock(&self.tls);
                match conn.reader().read(buf) {
                    // Ok(0) is a clean close_notify from the server
                    Ok(n) => return Ok(n),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(0),
                    Err(e) => return Err(NetworkError::ReceiveFailed(e.to_string())),
                }
            }

            let n = (&self.socket)
                .read(&mut self.ciphertext)
                .map_err(|e| NetworkError::ReceiveFailed(e.to_string()))?;
            if n == 0 {
                return Ok(0);
            }

            let mut conn = lock(&self.tls);
            let mut pending = &self.ciphertext[..n];
            while !pending.is_empty() {
                conn.read_tls(&mut pending)
                    .map_err(|e| NetworkError::ReceiveFailed(e.to_string()))?;
                conn.process_new_packets()
                    .map_err(|e| NetworkError::ReceiveFailed(format!("TLS error: {}", e)))?;
            }
            flush_tls(&mut conn, &self.socket)
                .map_err(|e| NetworkError::ReceiveFailed(e.to_string()))?;
        }
    }
}

// INLINE_TEST_REQUIRED: Tests connection-state handling without a live server
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport_disconnected() {
        let transport = TlsTransport::new();
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_write_without_connect_fails() {
        let mut transport = TlsTransport::new();
        let result = transport.write_raw(b"<presence/>");
        assert!(matches!(result, Err(NetworkError::NotConnected)));
    }

    #[test]
    fn test_take_reader_without_connect_fails() {
        let mut transport = TlsTransport::new();
        assert!(matches!(
            transport.take_reader(),
            Err(NetworkError::NotConnected)
        ));
    }

    #[test]
    fn test_disconnect_when_not_connected_ok() {
        let mut transport = TlsTransport::new();
        assert!(transport.disconnect().is_ok());
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_invalid_server_name_rejected() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let socket = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let result = TlsTransport::establish("not a host name", &socket);
        assert!(matches!(result, Err(NetworkError::ConnectionFailed(_))));
    }
}
