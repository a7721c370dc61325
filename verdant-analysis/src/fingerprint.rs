//! Compact, non-cryptographic text fingerprints.
//!
//! `h = h * 31 + unit` over the UTF-16 code units of the text with 32-bit
//! signed wraparound, rendered in decimal. Two different texts can share a
//! fingerprint; callers that need text equality must compare the text.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(i32);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let mut h: i32 = 0;
        for unit in text.encode_utf16() {
            h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
        Fingerprint(h)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal-string form of [`Fingerprint::of`].
///
/// ```
/// use verdant_analysis::fingerprint::hash;
///
/// assert_eq!(hash(""), "0");
/// assert_eq!(hash("a"), "97");
/// assert_eq!(hash("hello"), hash("hello"));
/// ```
pub fn hash(text: &str) -> String {
    Fingerprint::of(text).to_string()
}
