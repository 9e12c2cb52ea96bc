// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat API Layer
//!
//! High-level API over the session, handshake and roster engine.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use squadlink_core::api::{CallbackHandler, ChatClient, ChatConfig, ChatEvent, ChatRegion};
//! use squadlink_core::network::TlsTransport;
//!
//! let config = ChatConfig::for_region(ChatRegion::Eu1);
//! let mut client = ChatClient::new(TlsTransport::new(), config);
//! client.add_handler(Arc::new(CallbackHandler::new(|event| {
//!     if let ChatEvent::MessageReceived(msg) = event {
//!         println!("{}: {}", msg.address, msg.body);
//!     }
//! })));
//! let user = client.login(&auth_response)?;
//! ```
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the API layer
//! - [`config`] - Configuration types
//! - [`events`] - Event system for callbacks
//! - [`client`] - Login, outbound actions and roster snapshots

pub mod client;
pub mod config;
pub mod error;
pub mod events;

// Error types
pub use error::{ChatError, ChatResult, MAX_MESSAGE_LENGTH};

// Configuration
pub use config::{ChatConfig, ChatRegion};

// Events
pub use events::{CallbackHandler, ChatEvent, ChatMessage, EventDispatcher, EventHandler};

// Client
pub use client::ChatClient;
