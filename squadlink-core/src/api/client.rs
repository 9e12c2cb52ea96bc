// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Client
//!
//! Login, outbound actions and roster snapshots.
//!
//! `login` runs the handshake and the initial roster load on the caller's
//! thread, then starts one consumer thread that applies every later stanza
//! to the roster and dispatches the resulting events in order. Outbound
//! actions only write stanzas; the roster changes when the server echoes
//! them back.

use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::config::ChatConfig;
use super::error::{ChatError, ChatResult, MAX_MESSAGE_LENGTH};
use super::events::{ChatEvent, EventDispatcher, EventHandler};
use crate::handshake::{AuthResponse, Handshake, StanzaExchange, User};
use crate::network::{Session, SessionWriter, StanzaQueue, Transport};
use crate::presence::Presence;
use crate::roster::{Contact, FriendState, RosterEngine};
use crate::stanza::{build, Element};

type RosterSnapshot = Arc<RwLock<Vec<Contact>>>;

/// Chat client bound to one transport.
///
/// A client logs in once. After the stream ends it emits
/// [`ChatEvent::Disconnected`] and stays unusable; create a new client to
/// log in again. Dropping a logged-in client closes its connection.
pub struct ChatClient<T: Transport + 'static> {
    config: ChatConfig,
    transport: Option<T>,
    dispatcher: Arc<EventDispatcher>,
    writer: Option<SessionWriter<T>>,
    roster: RosterSnapshot,
    user: Option<User>,
    consumer: Option<JoinHandle<()>>,
}

impl<T: Transport + 'static> ChatClient<T> {
    /// Creates a client that will connect through `transport`.
    pub fn new(transport: T, config: ChatConfig) -> Self {
        ChatClient {
            config,
            transport: Some(transport),
            dispatcher: Arc::new(EventDispatcher::new()),
            writer: None,
            roster: Arc::new(RwLock::new(Vec::new())),
            user: None,
            consumer: None,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Registers an event handler. Handlers added after login still see
    /// every later event.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.dispatcher.add_handler(handler);
    }

    /// Returns the shared event dispatcher.
    pub fn events(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// The bound account, once logged in.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Connects, authenticates and loads the roster.
    ///
    /// Dispatches [`ChatEvent::Ready`] on the calling thread before any
    /// steady-state event.
    ///
    /// # Errors
    ///
    /// - [`ChatError::InvalidState`] when called a second time.
    /// - [`ChatError::Connection`] when the host is unreachable or the
    ///   stream breaks during the roster load.
    /// - [`ChatError::Auth`] when the handshake fails.
    pub fn login(&mut self, auth: &AuthResponse) -> ChatResult<User> {
        if self.user.is_some() {
            return Err(ChatError::InvalidState("already logged in".into()));
        }
        let transport = self
            .transport
            .take()
            .ok_or_else(|| ChatError::InvalidState("transport already used".into()))?;

        info!(host = %self.config.host, port = self.config.port, "connecting to chat");
        let mut session = Session::connect(transport, &self.config.transport())?;

        let mut handshake = Handshake::new(&self.config.stream_domain, &self.config.resource);
        let user = match handshake.run(&mut session, auth) {
            Ok(user) => user,
            Err(e) => {
                let _ = session.writer().close();
                return Err(e.into());
            }
        };

        let mut engine = RosterEngine::new();
        let loaded = session
            .send(&build::roster_query())
            .and_then(|()| session.recv())
            .map(|reply| engine.load_snapshot(&reply));
        if let Err(e) = loaded {
            warn!(error = %e, "roster load failed");
            let _ = session.writer().close();
            return Err(e.into());
        }
        publish(&self.roster, &engine);

        self.dispatcher.dispatch(ChatEvent::Ready { user: user.clone() });

        let (writer, queue) = session.into_parts();
        let roster = Arc::clone(&self.roster);
        let dispatcher = Arc::clone(&self.dispatcher);
        let consumer = thread::Builder::new()
            .name("squadlink-consumer".into())
            .spawn(move || consume(queue, engine, roster, dispatcher));
        let consumer = match consumer {
            Ok(handle) => handle,
            Err(e) => {
                let _ = writer.close();
                return Err(ChatError::InvalidState(format!("consumer thread: {}", e)));
            }
        };

        self.writer = Some(writer);
        self.consumer = Some(consumer);
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Closes the connection. The consumer loop ends with the stream and
    /// emits [`ChatEvent::Disconnected`].
    pub fn logout(&mut self) -> ChatResult<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| ChatError::InvalidState("not logged in".into()))?;
        writer.close()?;
        info!("chat session closed");
        Ok(())
    }

    /// Blocks until the consumer loop has stopped and its final
    /// [`ChatEvent::Disconnected`] has been dispatched.
    pub fn wait(&mut self) {
        if let Some(handle) = self.consumer.take() {
            if handle.join().is_err() {
                warn!("consumer thread panicked");
            }
        }
    }

    /// Snapshot of the whole roster.
    pub fn contacts(&self) -> Vec<Contact> {
        read_snapshot(&self.roster).clone()
    }

    /// Confirmed friends.
    pub fn friends(&self) -> Vec<Contact> {
        self.contacts_in(FriendState::Confirmed)
    }

    /// Requests we received and have not answered.
    pub fn incoming_requests(&self) -> Vec<Contact> {
        self.contacts_in(FriendState::Incoming)
    }

    /// Requests we sent that are still pending.
    pub fn outgoing_requests(&self) -> Vec<Contact> {
        self.contacts_in(FriendState::Outgoing)
    }

    pub fn contact_by_player_id(&self, player_id: &str) -> Option<Contact> {
        read_snapshot(&self.roster)
            .iter()
            .find(|c| c.player_id() == player_id)
            .cloned()
    }

    pub fn contact_by_address(&self, address: &str) -> Option<Contact> {
        read_snapshot(&self.roster)
            .iter()
            .find(|c| c.address() == address)
            .cloned()
    }

    fn contacts_in(&self, state: FriendState) -> Vec<Contact> {
        read_snapshot(&self.roster)
            .iter()
            .filter(|c| c.state() == state)
            .cloned()
            .collect()
    }

    /// Sends a chat message to a contact.
    pub fn send_message(&self, contact: &Contact, body: &str) -> ChatResult<()> {
        self.send_message_to(contact.address(), body)
    }

    /// Sends a chat message to a routing address.
    ///
    /// Bodies longer than [`MAX_MESSAGE_LENGTH`] characters are rejected
    /// without writing anything.
    pub fn send_message_to(&self, address: &str, body: &str) -> ChatResult<()> {
        let length = body.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(ChatError::MessageTooLong { length });
        }
        let writer = self.writer()?;
        let id = writer.next_message_id();
        debug!(%address, %id, "sending message");
        writer.send(&build::chat_message(&id, address, body))?;
        Ok(())
    }

    /// Accepts an incoming friend request.
    ///
    /// Does nothing unless the contact is [`FriendState::Incoming`].
    pub fn accept_friend_request(&self, contact: &Contact) -> ChatResult<()> {
        if contact.state() != FriendState::Incoming {
            debug!(player_id = contact.player_id(), state = ?contact.state(), "not an incoming request");
            return Ok(());
        }
        self.send(&build::roster_add_by_player_id(contact.player_id()))
    }

    /// Removes a friend, or declines or cancels a pending request.
    pub fn remove_friend(&self, contact: &Contact) -> ChatResult<()> {
        self.send(&build::roster_remove(contact.address()))
    }

    /// Sends a friend request by stable player id.
    pub fn send_friend_request(&self, player_id: &str) -> ChatResult<()> {
        self.send(&build::roster_add_by_player_id(player_id))
    }

    /// Sends a friend request by display name and tag.
    pub fn send_friend_request_by_name(&self, name: &str, tag: &str) -> ChatResult<()> {
        self.send(&build::roster_add_by_name(name, tag))
    }

    /// Broadcasts our presence.
    pub fn send_presence(&self, presence: &Presence) -> ChatResult<()> {
        let encoded = self.encode_presence(presence)?;
        self.send(&build::presence(&encoded, None))
    }

    /// Sends our presence to one confirmed friend.
    pub fn send_presence_to(&self, contact: &Contact, presence: &Presence) -> ChatResult<()> {
        if contact.state() != FriendState::Confirmed {
            return Err(ChatError::InvalidState(format!(
                "{} is not a confirmed friend",
                contact.display_name()
            )));
        }
        let encoded = self.encode_presence(presence)?;
        self.send(&build::presence(&encoded, Some(contact.address())))
    }

    fn encode_presence(&self, presence: &Presence) -> ChatResult<String> {
        let mut presence = presence.clone();
        if let Some(version) = &self.config.client_version {
            presence.party_client_version = version.clone();
        }
        presence.encode().map_err(|e| ChatError::Encode(e.to_string()))
    }

    fn send(&self, element: &Element) -> ChatResult<()> {
        self.writer()?.send(element)?;
        Ok(())
    }

    fn writer(&self) -> ChatResult<&SessionWriter<T>> {
        self.writer
            .as_ref()
            .ok_or_else(|| ChatError::InvalidState("not logged in".into()))
    }
}

impl<T: Transport + 'static> Drop for ChatClient<T> {
    /// Closes a live session so the reader and consumer threads wind down.
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            debug!("closing chat session on drop");
            let _ = writer.close();
        }
    }
}

fn read_snapshot(roster: &RosterSnapshot) -> std::sync::RwLockReadGuard<'_, Vec<Contact>> {
    roster.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn publish(roster: &RosterSnapshot, engine: &RosterEngine) {
    let contacts = engine.roster().contacts().to_vec();
    *roster.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = contacts;
}

/// Consumer loop: one stanza at a time, roster first, then its events.
fn consume(
    queue: StanzaQueue,
    mut engine: RosterEngine,
    roster: RosterSnapshot,
    dispatcher: Arc<EventDispatcher>,
) {
    loop {
        let stanza = match queue.recv() {
            Ok(stanza) => stanza,
            Err(e) => {
                info!(reason = %e, "chat stream ended");
                dispatcher.dispatch(ChatEvent::Disconnected {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let events = engine.apply(&stanza);
        if events.is_empty() {
            continue;
        }
        publish(&roster, &engine);
        for event in events {
            dispatcher.dispatch(event);
        }
    }
}
