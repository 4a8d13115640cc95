//! Cursor-based history listing
//!
//! Pages are reverse range scans over a timeline's index, bounded above by
//! the position encoded in the cursor. Appends only ever land above the
//! newest position, so pages already handed out never shift.

use crate::codec;
use crate::error::{Result, StoreError};
use crate::journal::Journal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;
use trail_core::{OwnerKey, Position, Version, VersionId};

/// Cursor token format version
const CURSOR_TAG: u8 = 1;
const CURSOR_LEN: usize = 17;

/// Opaque position in a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: Position,
}

impl Cursor {
    fn after(version: &Version) -> Self {
        Self {
            position: version.position(),
        }
    }

    /// Decode a token previously returned in [`Page::next_cursor`]
    pub fn parse(token: &str) -> Result<Self> {
        let malformed = || StoreError::InvalidArgument(format!("malformed cursor: {:?}", token));

        let raw = hex::decode(token.trim()).map_err(|_| malformed())?;
        if raw.len() != CURSOR_LEN || raw[0] != CURSOR_TAG {
            return Err(malformed());
        }

        let mut word = [0u8; 8];
        word.copy_from_slice(&raw[1..9]);
        let created_at = u64::from_be_bytes(word);
        word.copy_from_slice(&raw[9..17]);
        let id = VersionId(u64::from_be_bytes(word));

        Ok(Self {
            position: Position { created_at, id },
        })
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = [0u8; CURSOR_LEN];
        raw[0] = CURSOR_TAG;
        raw[1..9].copy_from_slice(&self.position.created_at.to_be_bytes());
        raw[9..].copy_from_slice(&self.position.id.0.to_be_bytes());
        f.write_str(&hex::encode(raw))
    }
}

impl FromStr for Cursor {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Cursor::parse(s)
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One slice of a timeline, newest first
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<Version>,
    /// Present when older versions remain
    pub next_cursor: Option<Cursor>,
    /// Timeline length when the page was read (may be stale under concurrent saves)
    pub total: u64,
}

impl Journal {
    /// List a timeline newest first
    ///
    /// `page_size` is clamped to `1..=max_page_size`. Without a cursor the
    /// listing starts at the head; with one it continues strictly below the
    /// last item of the previous page.
    pub fn list(&self, key: OwnerKey, page_size: usize, cursor: Option<&Cursor>) -> Result<Page> {
        let page_size = self.config.clamp_page_size(page_size);
        let total = self.count(key)?;

        let start = Bound::Included(codec::owner_key(key).to_vec());
        let end = match cursor {
            Some(cursor) => Bound::Excluded(codec::timeline_key(key, cursor.position).to_vec()),
            None => Bound::Included(codec::timeline_key(key, newest_possible()).to_vec()),
        };

        let mut items = Vec::with_capacity(page_size);
        let mut has_more = false;

        for raw in self.timeline.range::<Vec<u8>, _>((start, end)).keys().rev() {
            let raw = raw?;
            if items.len() == page_size {
                has_more = true;
                break;
            }

            let (_, position) = codec::parse_timeline_key(&raw)
                .ok_or_else(|| StoreError::Corrupt(format!("timeline key of {} bytes", raw.len())))?;
            // Skips entries removed by a purge that raced this scan
            if let Some(version) = self.find(position.id)? {
                items.push(version);
            }
        }

        let next_cursor = if has_more {
            items.last().map(Cursor::after)
        } else {
            None
        };

        tracing::debug!(key = %key, returned = items.len(), total, has_more, "listed history");
        Ok(Page {
            items,
            next_cursor,
            total,
        })
    }
}

fn newest_possible() -> Position {
    Position {
        created_at: u64::MAX,
        id: VersionId(u64::MAX),
    }
}
