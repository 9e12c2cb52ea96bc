// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for chat events. Events are dispatched from a single consumer
//! loop, one at a time and in stanza order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{error, trace};

use super::error::ChatError;
use crate::handshake::User;
use crate::presence::Presence;
use crate::roster::Contact;

/// A chat message received from another player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender's routing address.
    pub address: String,
    /// Sender's player id when they are on the roster.
    pub contact_id: Option<String>,
    /// Message text.
    pub body: String,
    /// Server timestamp, when present and parseable.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Events emitted by the chat client.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Login finished and the roster is loaded.
    Ready {
        /// The bound account.
        user: User,
    },

    /// A message arrived.
    MessageReceived(ChatMessage),

    /// Presence from an address that is not on the roster.
    PresenceReceived {
        /// Sender's routing address.
        address: String,
        /// Decoded payload.
        presence: Presence,
    },

    /// A roster contact's presence changed.
    FriendPresenceChanged {
        /// Copy taken before the update.
        old: Contact,
        /// State after the update.
        new: Contact,
    },

    /// Someone sent us a friend request.
    FriendRequestReceived {
        /// The requesting contact.
        contact: Contact,
    },

    /// We sent a friend request (possibly from another client).
    FriendRequestSent {
        /// The requested contact.
        contact: Contact,
    },

    /// A friendship was confirmed.
    FriendAdded {
        /// The new friend.
        contact: Contact,
    },

    /// A friend or pending request was removed.
    FriendRemoved {
        /// Player id named by the removal.
        player_id: String,
        /// Last known state, `None` if the player was not on the roster.
        contact: Option<Contact>,
    },

    /// The stream ended after login. Emitted once; no reconnect follows.
    Disconnected {
        /// Why the consumer loop stopped.
        reason: String,
    },
}

impl ChatEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Ready { .. } => "ready",
            ChatEvent::MessageReceived(_) => "message_received",
            ChatEvent::PresenceReceived { .. } => "presence_received",
            ChatEvent::FriendPresenceChanged { .. } => "friend_presence_changed",
            ChatEvent::FriendRequestReceived { .. } => "friend_request_received",
            ChatEvent::FriendRequestSent { .. } => "friend_request_sent",
            ChatEvent::FriendAdded { .. } => "friend_added",
            ChatEvent::FriendRemoved { .. } => "friend_removed",
            ChatEvent::Disconnected { .. } => "disconnected",
        }
    }
}

/// Event handler trait.
///
/// Implement this trait to receive chat events. A panicking handler is
/// logged and skipped; it does not affect other handlers or later events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ChatEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    fn on_event(&self, event: ChatEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
///
/// Shared between the client (which registers handlers) and the consumer
/// loop (which dispatches). The handler list is copied before each
/// dispatch, so no lock is held while handlers run.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&self) {
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Dispatches an event to all handlers, in registration order.
    ///
    /// Returns the errors of handlers that panicked; they have already been
    /// logged.
    pub fn dispatch(&self, event: ChatEvent) -> Vec<ChatError> {
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let name = event.name();
        trace!(event = name, handlers = handlers.len(), "dispatching");

        let mut failures = Vec::new();
        for handler in handlers {
            let event = event.clone();
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler.on_event(event)));
            if let Err(payload) = result {
                let err = ChatError::Dispatch(panic_message(payload.as_ref()));
                error!(event = name, error = %err, "event handler failed");
                failures.push(err);
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "handler panicked".to_string()
    }
}
