// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pattern-key fingerprinting.
//!
//! A pattern key is a deterministic, collision-tolerant fingerprint of an
//! approved response text, used to group approvals and re-identify reuse.
//! The hash is the dashboard's historical 32-bit accumulator over UTF-16
//! code units, so keys computed here match keys already recorded in stored
//! data and in audit `details` strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed prefix carried by every rendered key. Downstream tooling greps
/// audit details for this token, so the rendering is a wire contract.
pub const PATTERN_KEY_PREFIX: &str = "pattern:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey(pub String);

impl PatternKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatternKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fingerprint `text` into a stable `pattern:<base36>` key.
///
/// Empty input is defined: it hashes to 0 and yields `pattern:0`.
pub fn pattern_key(text: &str) -> PatternKey {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        // h = h * 31 + unit, wrapping at 32 bits
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    let magnitude = (hash as i64).unsigned_abs();
    PatternKey(format!("{PATTERN_KEY_PREFIX}{}", to_base36(magnitude)))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let text = "Our refund policy allows returns within 30 days.";
        assert_eq!(pattern_key(text), pattern_key(text));
    }

    #[test]
    fn empty_input_is_stable() {
        assert_eq!(pattern_key("").as_str(), "pattern:0");
        assert_eq!(pattern_key(""), pattern_key(""));
    }

    #[test]
    fn nearby_inputs_do_not_collide() {
        // single code units map straight through the accumulator
        assert_eq!(pattern_key("a").as_str(), "pattern:2p");
        assert_eq!(pattern_key("b").as_str(), "pattern:2q");
        assert_ne!(pattern_key("a"), pattern_key("b"));
    }

    #[test]
    fn key_carries_wire_prefix() {
        assert!(pattern_key("anything").as_str().starts_with(PATTERN_KEY_PREFIX));
    }
}
