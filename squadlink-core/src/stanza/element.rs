// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Element Tree
//!
//! Minimal owned XML tree used both for parsing framed stanzas and for
//! building outbound ones.

use std::fmt;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::StanzaError;

/// A child node of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Unescaped character data.
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element. `name` may carry a prefix (`stream:features`).
    pub fn new(name: &str) -> Self {
        Element {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds (or replaces) an attribute.
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Qualified tag name as it appeared on the wire.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Returns an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over child elements, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|el| el.local_name() == name)
    }

    /// Follows a path of child names, e.g. `["query", "item"]`.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |current, name| current.child(name))
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Parses every top-level element in `text`.
    ///
    /// Framed text normally holds exactly one element, but sibling elements
    /// are returned in order. Declarations, comments and whitespace between
    /// elements are skipped.
    pub fn parse_all(text: &str) -> Result<Vec<Element>, StanzaError> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut roots = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Element::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let el = Element::from_start(&start)?;
                    attach(&mut stack, &mut roots, el);
                }
                Ok(Event::End(_)) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| StanzaError::Malformed("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut roots, el);
                }
                Ok(Event::Text(raw)) => {
                    let text = raw
                        .unescape()
                        .map_err(|e| StanzaError::Malformed(e.to_string()))?;
                    if let Some(parent) = stack.last_mut() {
                        if !text.trim().is_empty() {
                            parent.children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(StanzaError::Malformed(e.to_string())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(StanzaError::Malformed(format!(
                "unclosed element <{}>",
                open.name
            )));
        }
        Ok(roots)
    }

    /// Parses exactly one element.
    pub fn parse(text: &str) -> Result<Element, StanzaError> {
        let mut roots = Self::parse_all(text)?;
        match roots.len() {
            1 => Ok(roots.remove(0)),
            0 => Err(StanzaError::Empty),
            n => Err(StanzaError::Malformed(format!("expected one element, found {}", n))),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element, StanzaError> {
        let mut el = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| StanzaError::Malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| StanzaError::Malformed(e.to_string()))?;
            el.attributes.push((key, value.into_owned()));
        }
        Ok(el)
    }
}

fn attach(stack: &mut [Element], roots: &mut Vec<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => roots.push(el),
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                Node::Element(el) => write!(f, "{}", el)?,
                Node::Text(text) => f.write_str(&partial_escape(text.as_str()))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

// INLINE_TEST_REQUIRED: Tests private attach/from_start helpers through parse_all
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_tree() {
        let el = Element::parse(
            r#"<iq type="result"><query><item jid="a@x" puuid="p1"><id name="Ann" tagline="EUW"/></item></query></iq>"#,
        )
        .unwrap();
        assert_eq!(el.name(), "iq");
        let item = el.find(&["query", "item"]).unwrap();
        assert_eq!(item.attr("puuid"), Some("p1"));
        assert_eq!(item.child("id").unwrap().attr("tagline"), Some("EUW"));
    }

    #[test]
    fn test_parse_siblings() {
        let roots = Element::parse_all("<a/><b>x</b>").unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].text(), "x");
    }

    #[test]
    fn test_parse_unclosed_fails() {
        assert!(matches!(
            Element::parse("<presence><show>"),
            Err(StanzaError::Malformed(_))
        ));
    }

    #[test]
    fn test_display_escapes() {
        let el = Element::new("message")
            .with_attr("to", "a\"b")
            .with_child(Element::new("body").with_text("1 < 2 & 'ok'"));
        assert_eq!(
            el.to_string(),
            r#"<message to="a&quot;b"><body>1 &lt; 2 &amp; 'ok'</body></message>"#
        );
    }

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(Element::new("stream:features").local_name(), "features");
    }
}
