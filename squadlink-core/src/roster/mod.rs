// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Roster Module
//!
//! Contacts known to the session and the relationship each one is in.
//! The [`Roster`] owns every [`Contact`]; everything outside the consumer
//! loop sees cloned snapshots.

pub mod engine;

pub use engine::RosterEngine;

use crate::presence::Presence;
use crate::stanza::Element;

/// Relationship between the local user and a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FriendState {
    /// Both sides accepted.
    Confirmed,
    /// They sent us a request.
    Incoming,
    /// We sent them a request.
    Outgoing,
}

/// Relationship change carried by a roster item's `subscription` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipChange {
    Confirmed,
    Incoming,
    Outgoing,
    Removed,
}

impl RelationshipChange {
    /// Maps a `subscription` value. Unknown values yield `None`.
    pub fn from_subscription(value: &str) -> Option<Self> {
        match value {
            "both" => Some(RelationshipChange::Confirmed),
            "pending_in" => Some(RelationshipChange::Incoming),
            "pending_out" => Some(RelationshipChange::Outgoing),
            "remove" => Some(RelationshipChange::Removed),
            _ => None,
        }
    }

    /// Friend state after this change, or `None` for a removal.
    pub fn friend_state(self) -> Option<FriendState> {
        match self {
            RelationshipChange::Confirmed => Some(FriendState::Confirmed),
            RelationshipChange::Incoming => Some(FriendState::Incoming),
            RelationshipChange::Outgoing => Some(FriendState::Outgoing),
            RelationshipChange::Removed => None,
        }
    }
}

/// A contact on the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Display name
    name: String,
    /// Name tag shown after `#`
    tag: String,
    /// Stable player id, unchanged across sessions
    player_id: String,
    /// Opaque routing address for stanzas to and from this contact
    address: String,
    state: FriendState,
    online: bool,
    presence: Option<Presence>,
}

impl Contact {
    /// Creates an offline contact.
    pub fn new(name: &str, tag: &str, player_id: &str, address: &str, state: FriendState) -> Self {
        Contact {
            name: name.to_string(),
            tag: tag.to_string(),
            player_id: player_id.to_string(),
            address: address.to_string(),
            state,
            online: false,
            presence: None,
        }
    }

    /// Builds a contact from a roster `<item>`.
    ///
    /// Returns `None` when the item lacks a player id or address.
    pub fn from_roster_item(item: &Element, state: FriendState) -> Option<Self> {
        let player_id = item.attr("puuid")?;
        let address = item.attr("jid")?;
        let id = item.child("id");
        let name = id.and_then(|id| id.attr("name")).unwrap_or_default();
        let tag = id.and_then(|id| id.attr("tagline")).unwrap_or_default();
        Some(Contact::new(name, tag, player_id, address, state))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `name#tag`
    pub fn display_name(&self) -> String {
        format!("{}#{}", self.name, self.tag)
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> FriendState {
        self.state
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn presence(&self) -> Option<&Presence> {
        self.presence.as_ref()
    }

    pub(crate) fn set_online(&mut self, presence: Presence) {
        self.online = true;
        self.presence = Some(presence);
    }

    pub(crate) fn set_offline(&mut self) {
        self.online = false;
        self.presence = None;
    }
}

/// Whether an upsert added a contact or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Ordered contact collection.
///
/// Invariant: at most one contact per routing address, and at most one per
/// player id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    contacts: Vec<Contact>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all contents. Later duplicates win.
    pub fn replace_all(&mut self, contacts: Vec<Contact>) {
        self.contacts.clear();
        for contact in contacts {
            self.upsert(contact);
        }
    }

    /// Replaces the entry with the same player id, else the one with the
    /// same address, else appends. Live presence survives a replacement of
    /// the same player.
    pub fn upsert(&mut self, mut contact: Contact) -> UpsertOutcome {
        let existing = self
            .position_by_player_id(&contact.player_id)
            .or_else(|| self.position_by_address(&contact.address));

        match existing {
            Some(index) => {
                let previous = &self.contacts[index];
                if previous.player_id == contact.player_id && !contact.online {
                    contact.online = previous.online;
                    contact.presence = previous.presence.clone();
                }
                // A different entry may still hold the address
                let address = contact.address.clone();
                self.contacts[index] = contact;
                let mut i = 0;
                self.contacts.retain(|c| {
                    let keep = i == index || c.address != address;
                    i += 1;
                    keep
                });
                UpsertOutcome::Replaced
            }
            None => {
                self.contacts.push(contact);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Removes and returns the contact with this player id.
    pub fn remove_by_player_id(&mut self, player_id: &str) -> Option<Contact> {
        let index = self.position_by_player_id(player_id)?;
        Some(self.contacts.remove(index))
    }

    pub fn get_by_address(&self, address: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.address == address)
    }

    pub fn get_by_player_id(&self, player_id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.player_id == player_id)
    }

    pub(crate) fn get_by_address_mut(&mut self, address: &str) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.address == address)
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contacts in the given state.
    pub fn with_state(&self, state: FriendState) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(move |c| c.state == state)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    fn position_by_player_id(&self, player_id: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.player_id == player_id)
    }

    fn position_by_address(&self, address: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.address == address)
    }
}
