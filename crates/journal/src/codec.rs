//! On-disk key layout and record encoding
//!
//! All integers in keys are big-endian so sled's lexicographic key order
//! matches numeric order:
//!
//! ```text
//! versions:  version_id                                 -> Version
//! timeline:  owner_id | subject_id | created_at | id    -> ()
//! heads:     owner_id | subject_id                      -> HeadRecord
//! ```

use crate::error::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use trail_core::{ContentHash, OwnerId, OwnerKey, Position, SubjectId, VersionId};

/// Length of an owner key prefix
pub const KEY_LEN: usize = 16;
/// Length of a full timeline index key
pub const TIMELINE_KEY_LEN: usize = KEY_LEN + 16;

/// Head pointer of one timeline, rewritten on every append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRecord {
    pub position: Position,
    pub content_hash: ContentHash,
    /// Number of versions in the timeline
    pub count: u64,
    /// How many of them are checkpoints
    pub checkpoints: u64,
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn version_key(id: VersionId) -> [u8; 8] {
    id.0.to_be_bytes()
}

pub fn owner_prefix(owner: OwnerId) -> [u8; 8] {
    owner.0.to_be_bytes()
}

pub fn owner_key(key: OwnerKey) -> [u8; KEY_LEN] {
    let mut out = [0u8; KEY_LEN];
    out[..8].copy_from_slice(&key.owner.0.to_be_bytes());
    out[8..].copy_from_slice(&key.subject.0.to_be_bytes());
    out
}

pub fn timeline_key(key: OwnerKey, position: Position) -> [u8; TIMELINE_KEY_LEN] {
    let mut out = [0u8; TIMELINE_KEY_LEN];
    out[..KEY_LEN].copy_from_slice(&owner_key(key));
    out[KEY_LEN..KEY_LEN + 8].copy_from_slice(&position.created_at.to_be_bytes());
    out[KEY_LEN + 8..].copy_from_slice(&position.id.0.to_be_bytes());
    out
}

/// Decode a `heads` key
pub fn parse_owner_key(raw: &[u8]) -> Option<OwnerKey> {
    if raw.len() != KEY_LEN {
        return None;
    }
    Some(OwnerKey::new(OwnerId(word(raw, 0)), SubjectId(word(raw, 8))))
}

/// Split a timeline index key back into its owner key and position
pub fn parse_timeline_key(raw: &[u8]) -> Option<(OwnerKey, Position)> {
    if raw.len() != TIMELINE_KEY_LEN {
        return None;
    }

    let key = parse_owner_key(&raw[..KEY_LEN])?;
    let position = Position {
        created_at: word(raw, 16),
        id: VersionId(word(raw, 24)),
    };
    Some((key, position))
}

fn word(raw: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&raw[at..at + 8]);
    u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_core::hash_content;

    #[test]
    fn test_timeline_keys_sort_like_positions() {
        let key = OwnerKey::new(OwnerId(1), SubjectId(2));
        let positions = [
            Position { created_at: 5, id: VersionId(300) },
            Position { created_at: 5, id: VersionId(301) },
            Position { created_at: 256, id: VersionId(2) },
            Position { created_at: 1 << 40, id: VersionId(1) },
        ];

        let keys: Vec<_> = positions.iter().map(|p| timeline_key(key, *p)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_timeline_key_parse() {
        let key = OwnerKey::new(OwnerId(7), SubjectId(u64::MAX));
        let position = Position { created_at: 1_700_000_000_000, id: VersionId(42) };

        let raw = timeline_key(key, position);
        assert_eq!(parse_timeline_key(&raw), Some((key, position)));
        assert_eq!(parse_timeline_key(&raw[..10]), None);
        assert_eq!(parse_owner_key(&raw[..KEY_LEN]), Some(key));
        assert_eq!(parse_owner_key(&raw), None);
    }

    #[test]
    fn test_owner_key_is_prefix_of_timeline_key() {
        let key = OwnerKey::new(OwnerId(3), SubjectId(4));
        let raw = timeline_key(key, Position { created_at: 1, id: VersionId(1) });
        assert!(raw.starts_with(&owner_key(key)));
        assert!(raw.starts_with(&owner_prefix(key.owner)));
    }

    #[test]
    fn test_head_record_encoding() {
        let head = HeadRecord {
            position: Position { created_at: 9, id: VersionId(10) },
            content_hash: hash_content("print(1)"),
            count: 3,
            checkpoints: 1,
        };
        let bytes = encode(&head).unwrap();
        assert_eq!(decode::<HeadRecord>(&bytes).unwrap(), head);
        assert!(decode::<HeadRecord>(&bytes[..4]).is_err());
    }
}
