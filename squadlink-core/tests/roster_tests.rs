//! Tests for roster

use squadlink_core::roster::{Contact, FriendState, RelationshipChange, Roster, UpsertOutcome};
use squadlink_core::stanza::Element;

fn contact(player_id: &str, address: &str, state: FriendState) -> Contact {
    Contact::new("Name", "TAG", player_id, address, state)
}

#[test]
fn test_subscription_mapping() {
    assert_eq!(
        RelationshipChange::from_subscription("both"),
        Some(RelationshipChange::Confirmed)
    );
    assert_eq!(
        RelationshipChange::from_subscription("pending_in"),
        Some(RelationshipChange::Incoming)
    );
    assert_eq!(
        RelationshipChange::from_subscription("pending_out"),
        Some(RelationshipChange::Outgoing)
    );
    assert_eq!(
        RelationshipChange::from_subscription("remove"),
        Some(RelationshipChange::Removed)
    );
    assert_eq!(RelationshipChange::from_subscription("none"), None);
    assert_eq!(RelationshipChange::Removed.friend_state(), None);
}

#[test]
fn test_contact_from_roster_item() {
    let item = Element::parse(
        "<item jid='p1@eu1.pvp.net' puuid='p1' subscription='both'><id name='Jett' tagline='EUW'/></item>",
    )
    .unwrap();
    let contact = Contact::from_roster_item(&item, FriendState::Confirmed).unwrap();

    assert_eq!(contact.player_id(), "p1");
    assert_eq!(contact.address(), "p1@eu1.pvp.net");
    assert_eq!(contact.display_name(), "Jett#EUW");
    assert!(!contact.is_online());
    assert!(contact.presence().is_none());
}

#[test]
fn test_contact_from_item_without_player_id() {
    let item = Element::parse("<item jid='p1@eu1.pvp.net'/>").unwrap();
    assert!(Contact::from_roster_item(&item, FriendState::Confirmed).is_none());
}

#[test]
fn test_upsert_appends_once_then_replaces_in_place() {
    let mut roster = Roster::new();
    roster.upsert(contact("p0", "p0@x", FriendState::Confirmed));

    let outcome = roster.upsert(contact("p1", "p1@x", FriendState::Incoming));
    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert_eq!(roster.len(), 2);

    let outcome = roster.upsert(contact("p1", "p1@x", FriendState::Confirmed));
    assert_eq!(outcome, UpsertOutcome::Replaced);
    assert_eq!(roster.len(), 2);
    assert_eq!(roster.contacts()[1].player_id(), "p1");
    assert_eq!(roster.contacts()[1].state(), FriendState::Confirmed);
}

#[test]
fn test_upsert_keeps_addresses_unique() {
    let mut roster = Roster::new();
    roster.upsert(contact("p1", "shared@x", FriendState::Confirmed));
    roster.upsert(contact("p2", "p2@x", FriendState::Confirmed));

    // p2 moves onto p1's address
    roster.upsert(contact("p2", "shared@x", FriendState::Confirmed));

    let holders: Vec<_> = roster
        .contacts()
        .iter()
        .filter(|c| c.address() == "shared@x")
        .collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].player_id(), "p2");
    assert_eq!(roster.len(), 1);
}

#[test]
fn test_replace_all_drops_previous_contents() {
    let mut roster = Roster::new();
    roster.upsert(contact("old", "old@x", FriendState::Confirmed));

    roster.replace_all(vec![
        contact("a", "a@x", FriendState::Confirmed),
        contact("b", "b@x", FriendState::Outgoing),
    ]);

    assert_eq!(roster.len(), 2);
    assert!(roster.get_by_player_id("old").is_none());
    assert_eq!(roster.with_state(FriendState::Outgoing).count(), 1);
}

#[test]
fn test_remove_by_player_id() {
    let mut roster = Roster::new();
    roster.upsert(contact("p1", "p1@x", FriendState::Confirmed));

    let removed = roster.remove_by_player_id("p1").unwrap();
    assert_eq!(removed.address(), "p1@x");
    assert!(roster.is_empty());
    assert!(roster.remove_by_player_id("p1").is_none());
}

#[test]
fn test_lookup_by_address() {
    let mut roster = Roster::new();
    roster.upsert(contact("p1", "p1@x", FriendState::Confirmed));

    assert_eq!(roster.get_by_address("p1@x").unwrap().player_id(), "p1");
    assert!(roster.get_by_address("p2@x").is_none());
}
