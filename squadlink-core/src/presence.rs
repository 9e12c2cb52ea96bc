// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Presence
//!
//! In-game/menu state snapshot exchanged inside presence stanzas as
//! base64-encoded JSON. Every field has a default, so partial payloads from
//! other client versions still decode.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from decoding or encoding a presence payload.
#[derive(Error, Debug)]
pub enum PresenceError {
    /// Payload is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8.
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Decoded text is not a presence object.
    #[error("invalid presence json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Presence payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presence {
    pub is_valid: bool,
    pub session_loop_state: String,
    pub party_owner_session_loop_state: String,
    pub custom_game_name: String,
    pub custom_game_team: String,
    pub party_owner_match_map: String,
    pub party_owner_match_current_team: String,
    pub party_owner_match_score_ally_team: i32,
    pub party_owner_match_score_enemy_team: i32,
    pub party_owner_provisioning_flow: String,
    pub provisioning_flow: String,
    pub match_map: String,
    pub party_id: String,
    pub is_party_owner: bool,
    pub party_name: String,
    pub party_state: String,
    pub party_accessibility: String,
    pub max_party_size: i32,
    pub queue_id: String,
    #[serde(rename = "partyLFM")]
    pub party_lfm: bool,
    /// Filled from the client-version string before sending.
    pub party_client_version: String,
    pub party_size: i32,
    pub tournament_id: String,
    pub roster_id: String,
    pub party_version: i64,
    pub queue_entry_time: String,
    pub player_card_id: String,
    pub player_title_id: String,
    pub preferred_level_border_id: String,
    pub account_level: i32,
    pub competitive_tier: i32,
    pub leaderboard_position: i32,
    pub is_idle: bool,
}

impl Default for Presence {
    fn default() -> Self {
        Presence {
            is_valid: true,
            session_loop_state: "MENUS".into(),
            party_owner_session_loop_state: "MENUS".into(),
            custom_game_name: String::new(),
            custom_game_team: String::new(),
            party_owner_match_map: String::new(),
            party_owner_match_current_team: String::new(),
            party_owner_match_score_ally_team: 0,
            party_owner_match_score_enemy_team: 0,
            party_owner_provisioning_flow: "Invalid".into(),
            provisioning_flow: "Invalid".into(),
            match_map: String::new(),
            party_id: String::new(),
            is_party_owner: true,
            party_name: String::new(),
            party_state: "DEFAULT".into(),
            party_accessibility: "CLOSED".into(),
            max_party_size: 5,
            queue_id: "unrated".into(),
            party_lfm: false,
            party_client_version: "release-03.00-shipping-22-574489".into(),
            party_size: 1,
            tournament_id: String::new(),
            roster_id: String::new(),
            party_version: 1_624_747_525_203,
            queue_entry_time: "0001.01.01-00.00.00".into(),
            player_card_id: "c89194bd-4710-b54e-8d6c-60be6274fbb2".into(),
            player_title_id: "566b6a77-4f72-af35-6d17-43be14e73cb7".into(),
            preferred_level_border_id: String::new(),
            account_level: 1,
            competitive_tier: 24,
            leaderboard_position: 0,
            is_idle: false,
        }
    }
}

impl Presence {
    /// Encodes to the wire form: JSON, then base64.
    pub fn encode(&self) -> Result<String, PresenceError> {
        let json = serde_json::to_string(self)?;
        Ok(BASE64.encode(json.as_bytes()))
    }

    /// Decodes the wire form. Surrounding whitespace is ignored.
    pub fn decode(encoded: &str) -> Result<Self, PresenceError> {
        let bytes = BASE64.decode(encoded.trim())?;
        let json = String::from_utf8(bytes)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Returns true when the player is in a match rather than in menus.
    pub fn is_in_game(&self) -> bool {
        self.session_loop_state == "INGAME"
    }
}
