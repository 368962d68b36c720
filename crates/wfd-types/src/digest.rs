//! BLAKE3 content digests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest used for node content and sequence identities.
///
/// Two nodes whose settings serialize to the same canonical JSON share a
/// settings digest; the content digest additionally covers the node type and
/// the content of every nested node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Hash a JSON value in canonical form.
    ///
    /// `serde_json` keeps object keys sorted unless `preserve_order` is
    /// enabled, so equal values always produce equal bytes.
    pub fn of_json(value: &serde_json::Value) -> Self {
        Self::from_bytes(value.to_string().as_bytes())
    }

    /// Combine a sequence of byte chunks under a domain tag.
    pub fn combine<'a>(tag: &str, parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"wfd-v1:");
        hasher.update(tag.as_bytes());
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_bytes_is_deterministic() {
        assert_eq!(ContentHash::from_bytes(b"abc"), ContentHash::from_bytes(b"abc"));
        assert_ne!(ContentHash::from_bytes(b"abc"), ContentHash::from_bytes(b"abd"));
    }

    #[test]
    fn json_key_order_does_not_matter() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":[true,null]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b":[true,null],"a":1}"#).unwrap();
        assert_eq!(ContentHash::of_json(&a), ContentHash::of_json(&b));
        assert_ne!(ContentHash::of_json(&a), ContentHash::of_json(&json!({"a": 2})));
    }

    #[test]
    fn combine_is_length_prefixed() {
        let ab_c = ContentHash::combine("t", [b"ab".as_slice(), b"c".as_slice()]);
        let a_bc = ContentHash::combine("t", [b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(ab_c, a_bc);
    }

    #[test]
    fn combine_respects_tag() {
        let parts = [b"x".as_slice()];
        assert_ne!(ContentHash::combine("node", parts), ContentHash::combine("seq", parts));
    }

    #[test]
    fn short_hex_is_8_chars() {
        let h = ContentHash::from_bytes(b"test");
        assert_eq!(h.short_hex().len(), 8);
        assert_eq!(format!("{h}").len(), 64);
    }
}
