// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Roster & Presence Engine
//!
//! Classifies steady-state stanzas, applies them to the roster and returns
//! the events they produce. The engine never dispatches; the consumer loop
//! publishes the new roster snapshot and then hands the events on.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, trace};

use super::{Contact, RelationshipChange, Roster};
use crate::api::events::{ChatEvent, ChatMessage};
use crate::presence::Presence;
use crate::stanza::build::GAME_ELEMENT;
use crate::stanza::{Element, Stanza};

/// Owns the roster for the lifetime of a session.
#[derive(Debug, Default)]
pub struct RosterEngine {
    roster: Roster,
}

impl RosterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Loads the full roster from the reply to the initial roster query,
    /// replacing everything known so far. Returns the number of contacts.
    pub fn load_snapshot(&mut self, stanza: &Stanza) -> usize {
        let contacts: Vec<Contact> = stanza
            .element()
            .child("query")
            .map(|query| {
                query
                    .children()
                    .filter(|item| item.local_name() == "item")
                    .filter_map(|item| {
                        let change = item
                            .attr("subscription")
                            .and_then(RelationshipChange::from_subscription)?;
                        Contact::from_roster_item(item, change.friend_state()?)
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.roster.replace_all(contacts);
        debug!(contacts = self.roster.len(), "roster loaded");
        self.roster.len()
    }

    /// Applies one steady-state stanza and returns the derived events.
    pub fn apply(&mut self, stanza: &Stanza) -> Vec<ChatEvent> {
        match stanza {
            Stanza::Presence(el) => self.on_presence(stanza.source_address(), el),
            Stanza::Message(el) => self.on_message(stanza.source_address(), el),
            Stanza::Iq(el) => self.on_iq(el),
            Stanza::StreamMeta(el) => {
                trace!(name = el.name(), "ignoring stream stanza");
                Vec::new()
            }
        }
    }

    fn on_presence(&mut self, address: Option<&str>, el: &Element) -> Vec<ChatEvent> {
        let Some(address) = address else {
            return Vec::new();
        };

        let decoded = match el.find(&["games", GAME_ELEMENT, "p"]) {
            Some(payload) => Presence::decode(&payload.text()).map_err(|e| {
                debug!(%address, error = %e, "undecodable presence payload");
            }),
            None => Err(()),
        };

        let Some(contact) = self.roster.get_by_address_mut(address) else {
            return match decoded {
                Ok(presence) => vec![ChatEvent::PresenceReceived {
                    address: address.to_string(),
                    presence,
                }],
                Err(()) => Vec::new(),
            };
        };

        // Snapshot strictly before any field write
        let old = contact.clone();
        match decoded {
            Ok(presence) => contact.set_online(presence),
            Err(()) => contact.set_offline(),
        }

        vec![ChatEvent::FriendPresenceChanged {
            old,
            new: contact.clone(),
        }]
    }

    fn on_message(&self, address: Option<&str>, el: &Element) -> Vec<ChatEvent> {
        let (Some(address), Some(body)) = (address, el.child("body")) else {
            return Vec::new();
        };

        let contact_id = self
            .roster
            .get_by_address(address)
            .map(|c| c.player_id().to_string());

        vec![ChatEvent::MessageReceived(ChatMessage {
            address: address.to_string(),
            contact_id,
            body: body.text(),
            sent_at: el.attr("stamp").and_then(parse_stamp),
        })]
    }

    fn on_iq(&mut self, el: &Element) -> Vec<ChatEvent> {
        let Some(item) = el.find(&["query", "item"]) else {
            return Vec::new();
        };
        let Some(subscription) = item.attr("subscription") else {
            return Vec::new();
        };
        let Some(change) = RelationshipChange::from_subscription(subscription) else {
            debug!(%subscription, "ignoring unknown subscription");
            return Vec::new();
        };

        match change {
            RelationshipChange::Removed => {
                let player_id = item
                    .attr("puuid")
                    .map(str::to_string)
                    .or_else(|| {
                        item.attr("jid")
                            .and_then(|jid| self.roster.get_by_address(jid))
                            .map(|c| c.player_id().to_string())
                    })
                    .unwrap_or_default();
                let contact = self.roster.remove_by_player_id(&player_id);
                vec![ChatEvent::FriendRemoved { player_id, contact }]
            }
            RelationshipChange::Confirmed
            | RelationshipChange::Incoming
            | RelationshipChange::Outgoing => {
                let Some(state) = change.friend_state() else {
                    return Vec::new();
                };
                let Some(contact) = Contact::from_roster_item(item, state) else {
                    debug!("roster push without player id or address");
                    return Vec::new();
                };

                let outcome = self.roster.upsert(contact.clone());
                trace!(player_id = contact.player_id(), ?outcome, "roster upsert");
                // Re-read so the event carries presence kept by the upsert
                let contact = self
                    .roster
                    .get_by_player_id(contact.player_id())
                    .cloned()
                    .unwrap_or(contact);

                let event = match change {
                    RelationshipChange::Incoming => ChatEvent::FriendRequestReceived { contact },
                    RelationshipChange::Outgoing => ChatEvent::FriendRequestSent { contact },
                    _ => ChatEvent::FriendAdded { contact },
                };
                vec![event]
            }
        }
    }
}

/// Parses the server's `stamp` attribute as UTC.
///
/// Accepts RFC 3339 and the server's `YYYY-MM-DD HH:MM:SS.fff` form.
pub fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(stamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
