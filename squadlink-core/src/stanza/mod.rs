// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Stanzas
//!
//! Framing, parsing and construction of the protocol's top-level elements.
//!
//! - [`framer`] - byte chunks to complete element text
//! - [`element`] - owned element tree
//! - [`build`] - outbound stanza constructors

pub mod build;
pub mod element;
pub mod framer;

pub use element::{Element, Node};
pub use framer::StanzaFramer;

use thiserror::Error;

/// Errors raised while parsing framed stanza text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StanzaError {
    /// The text is not well-formed.
    #[error("malformed stanza: {0}")]
    Malformed(String),

    /// The text held no element at all.
    #[error("empty stanza")]
    Empty,
}

/// One complete top-level protocol element.
///
/// Stanzas are consumed once by the handshake or the roster engine and are
/// not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stanza {
    /// `<presence>`
    Presence(Element),
    /// `<message>`
    Message(Element),
    /// `<iq>`
    Iq(Element),
    /// Anything else: stream features, SASL results, stream errors.
    StreamMeta(Element),
}

impl Stanza {
    /// Wraps an element in the matching variant.
    pub fn from_element(element: Element) -> Self {
        match element.local_name() {
            "presence" => Stanza::Presence(element),
            "message" => Stanza::Message(element),
            "iq" => Stanza::Iq(element),
            _ => Stanza::StreamMeta(element),
        }
    }

    /// Parses framed text into stanzas, one per top-level element.
    pub fn parse(text: &str) -> Result<Vec<Stanza>, StanzaError> {
        Ok(Element::parse_all(text)?
            .into_iter()
            .map(Stanza::from_element)
            .collect())
    }

    /// The wrapped element.
    pub fn element(&self) -> &Element {
        match self {
            Stanza::Presence(el) | Stanza::Message(el) | Stanza::Iq(el) | Stanza::StreamMeta(el) => {
                el
            }
        }
    }

    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Stanza::Presence(_) => "presence",
            Stanza::Message(_) => "message",
            Stanza::Iq(_) => "iq",
            Stanza::StreamMeta(_) => "stream-meta",
        }
    }

    /// Routing address of the sender: the `from` attribute up to the first `/`.
    pub fn source_address(&self) -> Option<&str> {
        self.element()
            .attr("from")
            .map(|from| from.split('/').next().unwrap_or(from))
    }
}
