// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session
//!
//! A connected transport plus its reader thread. The reader feeds every
//! chunk through a [`StanzaFramer`] and pushes parsed stanzas onto a
//! single-producer/single-consumer channel; the consumer blocks on
//! [`StanzaQueue::recv`] until the next stanza or the end of the stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace, warn};

use super::error::NetworkError;
use super::transport::{ChunkReader, Transport, TransportConfig, TransportResult};
use crate::handshake::StanzaExchange;
use crate::stanza::{Element, Stanza, StanzaFramer};

/// Write half of a session. Cheap to clone; all clones share one transport.
pub struct SessionWriter<T: Transport> {
    transport: Arc<Mutex<T>>,
    message_counter: Arc<AtomicU64>,
}

impl<T: Transport> Clone for SessionWriter<T> {
    fn clone(&self) -> Self {
        SessionWriter {
            transport: Arc::clone(&self.transport),
            message_counter: Arc::clone(&self.message_counter),
        }
    }
}

impl<T: Transport> SessionWriter<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.transport
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes raw bytes.
    pub fn write_raw(&self, bytes: &[u8]) -> TransportResult<()> {
        self.lock().write_raw(bytes)
    }

    /// Serializes and writes one element.
    pub fn send(&self, element: &Element) -> TransportResult<()> {
        let text = element.to_string();
        trace!(stanza = element.name(), len = text.len(), "send");
        self.write_raw(text.as_bytes())
    }

    /// Next outbound message id: `<unix-millis>:<counter>`, counter from 1.
    pub fn next_message_id(&self) -> String {
        let counter = self.message_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{}:{}", millis, counter)
    }

    /// Disconnects the transport. The reader thread ends with the socket.
    pub fn close(&self) -> TransportResult<()> {
        self.lock().disconnect()
    }

    /// Runs `f` with the locked transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }
}

/// Read side of a session: stanzas in arrival order.
pub struct StanzaQueue {
    inbound: Receiver<Stanza>,
}

impl StanzaQueue {
    /// Blocks until the next stanza.
    ///
    /// Returns [`NetworkError::ConnectionClosed`] once the reader thread has
    /// stopped and the queue is drained.
    pub fn recv(&self) -> Result<Stanza, NetworkError> {
        self.inbound
            .recv()
            .map_err(|_| NetworkError::ConnectionClosed)
    }
}

/// A connected session.
///
/// The reader thread runs detached and stops when the stream ends or the
/// queue is dropped.
pub struct Session<T: Transport> {
    writer: SessionWriter<T>,
    queue: StanzaQueue,
}

impl<T: Transport + 'static> Session<T> {
    /// Connects the transport and starts the reader thread.
    ///
    /// Fails with [`NetworkError::ConnectionFailed`] when the host is
    /// unreachable or encryption cannot be established.
    pub fn connect(mut transport: T, config: &TransportConfig) -> TransportResult<Self> {
        transport.connect(config)?;
        let reader = transport.take_reader()?;

        let (tx, rx) = mpsc::channel();
        let buffer_size = config.read_buffer_size.max(1);
        thread::Builder::new()
            .name("squadlink-reader".into())
            .spawn(move || read_loop(reader, buffer_size, tx))
            .map_err(|e| NetworkError::ConnectionFailed(format!("reader thread: {}", e)))?;

        Ok(Session {
            writer: SessionWriter {
                transport: Arc::new(Mutex::new(transport)),
                message_counter: Arc::new(AtomicU64::new(0)),
            },
            queue: StanzaQueue { inbound: rx },
        })
    }
}

impl<T: Transport> Session<T> {
    pub fn writer(&self) -> &SessionWriter<T> {
        &self.writer
    }

    /// Splits into the write half and the stanza queue.
    pub fn into_parts(self) -> (SessionWriter<T>, StanzaQueue) {
        (self.writer, self.queue)
    }
}

impl<T: Transport> StanzaExchange for Session<T> {
    fn send_raw(&mut self, text: &str) -> Result<(), NetworkError> {
        self.writer.write_raw(text.as_bytes())
    }

    fn recv(&mut self) -> Result<Stanza, NetworkError> {
        let stanza = self.queue.recv()?;
        trace!(kind = stanza.kind(), name = stanza.element().name(), "recv");
        Ok(stanza)
    }
}

/// Reader thread body: socket chunks in, stanzas out.
fn read_loop(mut reader: Box<dyn ChunkReader>, buffer_size: usize, tx: Sender<Stanza>) {
    let mut framer = StanzaFramer::new();
    let mut buf = vec![0u8; buffer_size];

    loop {
        let n = match reader.read_chunk(&mut buf) {
            Ok(0) => {
                debug!("chat stream closed by peer");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "chat stream read failed");
                break;
            }
        };

        for text in framer.push(&buf[..n]) {
            let stanzas = match Stanza::parse(&text) {
                Ok(stanzas) => stanzas,
                Err(e) => {
                    warn!(error = %e, len = text.len(), "dropping unparseable stanza");
                    continue;
                }
            };
            for stanza in stanzas {
                if tx.send(stanza).is_err() {
                    debug!("stanza queue dropped, stopping reader");
                    return;
                }
            }
        }
    }
}
