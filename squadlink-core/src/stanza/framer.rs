// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Stanza Framer
//!
//! Reassembles complete top-level elements from arbitrarily chunked bytes.
//!
//! The input is cut into fragments at every `>`; each fragment is optional
//! character data followed by at most one tag. A fragment still missing its
//! `>` when a chunk ends is held back until the next chunk completes it, so a
//! split may fall anywhere: mid tag name, mid attribute, mid text.
//!
//! The framer is a finite-state accumulator: while idle it waits for the
//! start of a top-level element; while accumulating it appends fragments to
//! the element's buffer and tracks the stack of open tag names. When the tag
//! that opened the element is closed, the buffer is emitted as one stanza.
//!
//! Known limitation: a literal `>` inside character data is treated as a
//! fragment boundary. That is harmless (the text carries no tag, so the
//! state does not change), but a `<` in character data would be read as a
//! tag. The server escapes both in practice.
//!
//! The same cut applies inside attribute values. A value that ends in `/`
//! right before a literal `>`, as in `note="x/>"`, makes the tag look
//! self-closing: the element is emitted early and the rest of it is framed
//! as separate stanzas. Values from the server are escaped, so this only
//! affects hand-written input.

use tracing::{debug, warn};

/// Tag kind carried by a fragment.
#[derive(Debug, PartialEq, Eq)]
enum Tag<'a> {
    /// `<name ...>`
    Open(&'a str),
    /// `</name>`
    Close(&'a str),
    /// `<name .../>`
    SelfClosing(&'a str),
    /// `<?...?>`, `<!--...-->`, `<!DOCTYPE ...>`
    Meta,
    /// No tag, just character data ending in a stray `>`.
    None,
}

/// Framer state.
#[derive(Debug, Default)]
enum FramerState {
    /// Between top-level elements.
    #[default]
    Idle,
    /// Inside a top-level element.
    Accumulating {
        /// Raw text of the element so far.
        buffer: String,
        /// Names of currently open tags, outermost first.
        open: Vec<String>,
    },
}

/// Incremental stanza framer.
///
/// # Example
///
/// ```
/// use squadlink_core::stanza::StanzaFramer;
///
/// let mut framer = StanzaFramer::new();
/// assert!(framer.push(b"<message to=\"a\"><bo").is_empty());
/// let out = framer.push(b"dy>hi</body></message><presence/>");
/// assert_eq!(out, vec![
///     "<message to=\"a\"><body>hi</body></message>".to_string(),
///     "<presence/>".to_string(),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct StanzaFramer {
    state: FramerState,
    /// Bytes of a fragment whose `>` has not arrived yet.
    partial: Vec<u8>,
}

impl StanzaFramer {
    /// Creates an idle framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a top-level element is being accumulated.
    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, FramerState::Accumulating { .. })
    }

    /// Feeds one chunk and returns every stanza it completed, in order.
    ///
    /// Null bytes (padding from fixed-size reads) are stripped first.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut out = Vec::new();

        for &byte in chunk.iter().filter(|&&b| b != 0) {
            self.partial.push(byte);
            if byte == b'>' {
                // `>` is ASCII, so the fragment ends on a UTF-8 boundary
                let bytes = std::mem::take(&mut self.partial);
                let fragment = String::from_utf8_lossy(&bytes);
                if let Some(stanza) = self.accept(&fragment) {
                    out.push(stanza);
                }
            }
        }

        out
    }

    fn accept(&mut self, fragment: &str) -> Option<String> {
        match &mut self.state {
            FramerState::Idle => self.start(fragment),
            FramerState::Accumulating { buffer, open } => {
                buffer.push_str(fragment);
                match classify(fragment) {
                    Tag::Open(name) => open.push(name.to_string()),
                    Tag::Close(name) => match open.last() {
                        Some(top) if top == name => {
                            open.pop();
                        }
                        Some(top) => {
                            warn!(expected = %top, found = %name, "mismatched closing tag");
                            open.pop();
                        }
                        None => {}
                    },
                    Tag::SelfClosing(_) | Tag::Meta | Tag::None => {}
                }

                if open.is_empty() {
                    let stanza = std::mem::take(buffer);
                    self.state = FramerState::Idle;
                    Some(stanza)
                } else {
                    None
                }
            }
        }
    }

    fn start(&mut self, fragment: &str) -> Option<String> {
        // Whitespace between top-level elements is not part of any stanza
        let fragment = fragment.trim_start();

        match classify(fragment) {
            Tag::Meta => {
                debug!("discarding stream preamble declaration");
                None
            }
            Tag::Open(name) if is_stream_root(name) => {
                debug!("discarding stream opener");
                None
            }
            Tag::Close(name) if is_stream_root(name) => {
                debug!("server closed the stream element");
                None
            }
            Tag::SelfClosing(_) => Some(fragment.to_string()),
            Tag::Open(name) => {
                self.state = FramerState::Accumulating {
                    buffer: fragment.to_string(),
                    open: vec![name.to_string()],
                };
                None
            }
            Tag::Close(name) => {
                warn!(tag = %name, "closing tag with no open element");
                None
            }
            Tag::None => {
                if !fragment.is_empty() {
                    warn!(len = fragment.len(), "discarding text outside any element");
                }
                None
            }
        }
    }
}

fn is_stream_root(name: &str) -> bool {
    name == "stream:stream" || name == "stream"
}

/// Classifies the tag at the end of a `>`-terminated fragment.
fn classify(fragment: &str) -> Tag<'_> {
    let Some(lt) = fragment.find('<') else {
        return Tag::None;
    };
    let tag = &fragment[lt..];

    if tag.starts_with("<?") || tag.starts_with("<!") {
        return Tag::Meta;
    }
    if let Some(rest) = tag.strip_prefix("</") {
        return Tag::Close(tag_name(rest));
    }

    let name = tag_name(&tag[1..]);
    if tag.ends_with("/>") {
        Tag::SelfClosing(name)
    } else {
        Tag::Open(name)
    }
}

/// Reads the tag name token at the start of `rest`.
fn tag_name(rest: &str) -> &str {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

// INLINE_TEST_REQUIRED: Tests private classify/tag_name helpers
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(classify("<iq type=\"set\">"), Tag::Open("iq"));
        assert_eq!(classify("hello</body>"), Tag::Close("body"));
        assert_eq!(classify("<presence/>"), Tag::SelfClosing("presence"));
        assert_eq!(classify("<id name=\"a\" />"), Tag::SelfClosing("id"));
        assert_eq!(classify("<?xml version=\"1.0\"?>"), Tag::Meta);
        assert_eq!(classify("a > b"), Tag::None);
    }

    #[test]
    fn test_close_name_is_full_token() {
        assert_eq!(classify("</items>"), Tag::Close("items"));
        assert_ne!(classify("</items>"), Tag::Close("item"));
    }

    #[test]
    fn test_nested_same_name_waits_for_outer_close() {
        let mut framer = StanzaFramer::new();
        let out = framer.push(b"<item><item>x</item>");
        assert!(out.is_empty());
        assert!(framer.is_accumulating());
        let out = framer.push(b"</item>");
        assert_eq!(out, vec!["<item><item>x</item></item>".to_string()]);
    }
}
