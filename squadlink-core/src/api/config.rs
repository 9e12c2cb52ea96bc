// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::{TransportConfig, DEFAULT_CHAT_PORT, DEFAULT_READ_BUFFER_SIZE};

/// Resource name bound to the session.
pub const DEFAULT_RESOURCE: &str = "RC-SQUADLINK";

/// Chat shard a player's account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRegion {
    As2,
    Jp1,
    Br1,
    Eu1,
    Eu2,
    Eu3,
    Kr1,
    La1,
    La2,
    Na1,
    Oc1,
    Pb1,
    Ru1,
    Sa1,
    Sa2,
    Sa3,
    Sa4,
    Tr1,
    Us2,
}

impl ChatRegion {
    /// Lowercase shard code, e.g. `eu1`.
    pub fn code(self) -> &'static str {
        match self {
            ChatRegion::As2 => "as2",
            ChatRegion::Jp1 => "jp1",
            ChatRegion::Br1 => "br1",
            ChatRegion::Eu1 => "eu1",
            ChatRegion::Eu2 => "eu2",
            ChatRegion::Eu3 => "eu3",
            ChatRegion::Kr1 => "kr1",
            ChatRegion::La1 => "la1",
            ChatRegion::La2 => "la2",
            ChatRegion::Na1 => "na1",
            ChatRegion::Oc1 => "oc1",
            ChatRegion::Pb1 => "pb1",
            ChatRegion::Ru1 => "ru1",
            ChatRegion::Sa1 => "sa1",
            ChatRegion::Sa2 => "sa2",
            ChatRegion::Sa3 => "sa3",
            ChatRegion::Sa4 => "sa4",
            ChatRegion::Tr1 => "tr1",
            ChatRegion::Us2 => "us2",
        }
    }

    /// Chat shard serving this region. Differs from the region code for a
    /// few regions; the stream domain keeps the region code.
    pub fn chat_shard(self) -> &'static str {
        match self {
            ChatRegion::Br1 => "br",
            ChatRegion::Eu1 => "euw1",
            ChatRegion::Eu2 => "eun1",
            ChatRegion::Na1 => "na2",
            ChatRegion::Pb1 => "pbe1",
            other => other.code(),
        }
    }

    /// Chat server host for this region.
    pub fn host(self) -> String {
        format!("{}.chat.si.riotgames.com", self.chat_shard())
    }

    /// Domain named in the stream declaration.
    pub fn stream_domain(self) -> String {
        format!("{}.pvp.net", self.code())
    }
}

impl fmt::Display for ChatRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Chat client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat server host.
    pub host: String,
    /// Chat server port.
    pub port: u16,
    /// Domain sent in the stream declaration.
    pub stream_domain: String,
    /// Resource bound to the session.
    pub resource: String,
    /// Game client version written into outgoing presence.
    pub client_version: Option<String>,
    /// Fixed socket read size.
    pub read_buffer_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig::for_region(ChatRegion::Na1)
    }
}

impl ChatConfig {
    /// Config for a region's chat shard.
    pub fn for_region(region: ChatRegion) -> Self {
        ChatConfig {
            host: region.host(),
            port: DEFAULT_CHAT_PORT,
            stream_domain: region.stream_domain(),
            resource: DEFAULT_RESOURCE.to_string(),
            client_version: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Sets the client-version string.
    pub fn with_client_version(mut self, version: &str) -> Self {
        self.client_version = Some(version.to_string());
        self
    }

    /// Parses a JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.clone(),
            port: self.port,
            read_buffer_size: self.read_buffer_size,
        }
    }
}

// INLINE_TEST_REQUIRED: Tests region-derived defaults
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_hosts() {
        assert_eq!(ChatRegion::Eu1.host(), "euw1.chat.si.riotgames.com");
        assert_eq!(ChatRegion::Eu1.stream_domain(), "eu1.pvp.net");
        assert_eq!(ChatRegion::Us2.to_string(), "us2");
    }

    #[test]
    fn test_from_json_partial() {
        let config = ChatConfig::from_json(r#"{"host": "localhost", "port": 5333}"#).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5333);
        assert_eq!(config.resource, DEFAULT_RESOURCE);
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_transport_config() {
        let transport = ChatConfig::for_region(ChatRegion::Kr1).transport();
        assert_eq!(transport.host, "kr1.chat.si.riotgames.com");
        assert_eq!(transport.port, 5223);
    }

    #[test]
    fn test_default_config_uses_na_shard() {
        let config = ChatConfig::default();
        assert_eq!(config.host, "na2.chat.si.riotgames.com");
        assert_eq!(config.stream_domain, "na1.pvp.net");
    }
}
