// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory transport for tests. Inbound chunks are scripted up front with
//! [`MockTransport::queue_receive`] or pushed later through a [`MockRemote`];
//! every write is recorded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use super::error::NetworkError;
use super::transport::{ChunkReader, ConnectionState, Transport, TransportConfig, TransportResult};

type SentLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Item on the inbound queue.
enum Inbound {
    Data(Vec<u8>),
    /// End of stream, as after a socket shutdown.
    Closed,
}

fn sent_strings(log: &SentLog) -> Vec<String> {
    log.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// Mock transport for testing.
///
/// The read half reports end-of-stream when the transport disconnects, when
/// a [`MockRemote`] closes the stream, or once the transport and every
/// remote have been dropped.
pub struct MockTransport {
    state: ConnectionState,
    inbound_tx: Sender<Inbound>,
    inbound_rx: Option<Receiver<Inbound>>,
    sent: SentLog,
    fail_connect: bool,
    fail_write: Arc<AtomicBool>,
}

impl MockTransport {
    /// Creates a new disconnected mock transport.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        MockTransport {
            state: ConnectionState::Disconnected,
            inbound_tx: tx,
            inbound_rx: Some(rx),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_connect: false,
            fail_write: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queues an inbound chunk, delivered in order to the reader.
    pub fn queue_receive(&mut self, chunk: &str) {
        self.queue_bytes(chunk.as_bytes());
    }

    /// Queues raw inbound bytes.
    pub fn queue_bytes(&mut self, chunk: &[u8]) {
        let _ = self.inbound_tx.send(Inbound::Data(chunk.to_vec()));
    }

    /// Returns a handle for pushing chunks after the transport has been moved.
    pub fn remote(&self) -> MockRemote {
        MockRemote {
            inbound_tx: Some(self.inbound_tx.clone()),
            sent: Arc::clone(&self.sent),
            fail_write: Arc::clone(&self.fail_write),
        }
    }

    /// Makes the next `connect` fail.
    pub fn set_fail_connect(&mut self, fail: bool) {
        self.fail_connect = fail;
    }

    /// Makes every `write_raw` fail.
    pub fn set_fail_write(&mut self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Returns everything written so far, one entry per write.
    pub fn sent_messages(&self) -> Vec<String> {
        sent_strings(&self.sent)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _config: &TransportConfig) -> TransportResult<()> {
        if self.fail_connect {
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::ConnectionFailed("mock connect failure".into()));
        }
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        if self.state == ConnectionState::Connected {
            let _ = self.inbound_tx.send(Inbound::Closed);
        }
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn write_raw(&mut self, bytes: &[u8]) -> TransportResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(NetworkError::SendFailed("mock write failure".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(bytes.to_vec());
        Ok(())
    }

    fn take_reader(&mut self) -> TransportResult<Box<dyn ChunkReader>> {
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        let rx = self
            .inbound_rx
            .take()
            .ok_or_else(|| NetworkError::ReceiveFailed("reader already taken".into()))?;
        Ok(Box::new(MockReader {
            rx,
            leftover: Vec::new(),
        }))
    }
}

/// Test-side handle onto a [`MockTransport`].
#[derive(Clone)]
pub struct MockRemote {
    inbound_tx: Option<Sender<Inbound>>,
    sent: SentLog,
    fail_write: Arc<AtomicBool>,
}

impl MockRemote {
    /// Pushes an inbound chunk to the reader.
    pub fn push(&self, chunk: &str) {
        self.push_bytes(chunk.as_bytes());
    }

    /// Pushes raw inbound bytes to the reader.
    pub fn push_bytes(&self, chunk: &[u8]) {
        if let Some(tx) = &self.inbound_tx {
            let _ = tx.send(Inbound::Data(chunk.to_vec()));
        }
    }

    /// Returns everything the client has written so far.
    pub fn sent_messages(&self) -> Vec<String> {
        sent_strings(&self.sent)
    }

    /// Makes every later write on the transport fail.
    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Ends the stream, as a server closing the socket would.
    pub fn close(mut self) {
        if let Some(tx) = self.inbound_tx.take() {
            let _ = tx.send(Inbound::Closed);
        }
    }
}

struct MockReader {
    rx: Receiver<Inbound>,
    leftover: Vec<u8>,
}

impl ChunkReader for MockReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        while self.leftover.is_empty() {
            match self.rx.recv() {
                Ok(Inbound::Data(chunk)) => self.leftover = chunk,
                Ok(Inbound::Closed) | Err(_) => return Ok(0),
            }
        }

        // Chunks larger than the read buffer spill into the next read
        let n = self.leftover.len().min(buf.len());
        buf[..n].copy_from_slice(&self.leftover[..n]);
        self.leftover.drain(..n);
        Ok(n)
    }
}
