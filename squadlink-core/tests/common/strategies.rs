// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use proptest::prelude::*;

/// Character data without markup characters.
pub fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?#@:-]{0,40}"
}

/// Attribute values without quotes or markup characters.
pub fn attr_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9@./_-]{1,30}"
}

/// One well-formed top-level stanza.
pub fn stanza_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (attr_value_strategy(), text_strategy()).prop_map(|(from, body)| format!(
            "<message from=\"{}\" type=\"chat\"><body>{}</body></message>",
            from, body
        )),
        attr_value_strategy().prop_map(|from| format!("<presence from=\"{}\"/>", from)),
        (attr_value_strategy(), text_strategy()).prop_map(|(jid, name)| format!(
            "<iq type=\"set\"><query><item jid=\"{}\"><id name=\"{}\"/></item></query></iq>",
            jid, name
        )),
        (attr_value_strategy(), text_strategy()).prop_map(|(from, p)| format!(
            "<presence from=\"{}\"><games><valorant><p>{}</p></valorant></games></presence>",
            from, p
        )),
    ]
}

/// A stream of stanzas with the stream preamble in front.
pub fn stream_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    prop::collection::vec(stanza_strategy(), 1..8).prop_map(|stanzas| {
        let wire = format!(
            "<?xml version='1.0'?><stream:stream xmlns='jabber:client' version='1.0'>{}",
            stanzas.concat()
        );
        (wire, stanzas)
    })
}

/// Sorted, deduplicated split points inside `0..len`.
pub fn split_points(len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..=len, 0..16).prop_map(|mut points| {
        points.sort_unstable();
        points.dedup();
        points
    })
}
