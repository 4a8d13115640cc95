//! BLAKE3 content hashing for the dedup check on the save path

use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 digest of a program's text (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a hash from raw digest bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Convert to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short form used in log lines
    pub fn short(&self) -> String {
        let mut short = self.to_hex();
        short.truncate(12);
        short
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentHash").field(&self.short()).finish()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash program text
pub fn hash_content(content: &str) -> ContentHash {
    ContentHash::from_bytes(*blake3::hash(content.as_bytes()).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_content("print(1)"), hash_content("print(1)"));
        assert_ne!(hash_content("print(1)"), hash_content("print(2)"));
    }

    #[test]
    fn test_empty_content_hashes() {
        // Empty programs are valid saves and need a stable digest
        let hash = hash_content("");
        assert_eq!(hash, ContentHash::from_bytes(*blake3::hash(b"").as_bytes()));
    }

    #[test]
    fn test_hex_forms() {
        let hash = hash_content("snake");
        let hex = hash.to_hex();

        assert_eq!(hex.len(), 64);
        assert_eq!(hash.to_string(), hex);
        assert!(hex.starts_with(&hash.short()));
        assert_eq!(hash.short().len(), 12);
        assert_eq!(format!("{:?}", hash), format!("ContentHash({:?})", hash.short()));
    }
}
