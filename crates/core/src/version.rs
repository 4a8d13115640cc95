//! Version data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Learner identity (owned by the surrounding application)
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

/// Exercise identity (owned by the surrounding application)
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u64);

/// Store-wide version identifier, assigned monotonically
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub u64);

macro_rules! id_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

id_display!(OwnerId, SubjectId, VersionId);

/// One learner's timeline for one exercise
///
/// Every ordering and dedup rule is scoped to a single key; timelines
/// under different keys never interact.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OwnerKey {
    pub owner: OwnerId,
    pub subject: SubjectId,
}

impl OwnerKey {
    pub fn new(owner: OwnerId, subject: SubjectId) -> Self {
        Self { owner, subject }
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.subject)
    }
}

/// Position of a version inside its timeline
///
/// Timelines are ordered by `(created_at, id)` ascending, so the derived
/// `Ord` on this struct is the timeline order.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub created_at: u64,
    pub id: VersionId,
}

/// A stored program snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Unique ID (store-wide, monotonic)
    pub id: VersionId,
    /// Owning timeline
    pub key: OwnerKey,
    /// Full program text at this point
    pub content: String,
    /// Optional note, normally only on checkpoints
    pub annotation: Option<String>,
    /// Deliberate save (exempt from dedup)
    pub checkpoint: bool,
    /// Timestamp (Unix milliseconds), assigned by the store
    pub created_at: u64,
}

impl Version {
    /// Ordering position of this version within its timeline
    pub fn position(&self) -> Position {
        Position {
            created_at: self.created_at,
            id: self.id,
        }
    }

    /// First `max_chars` characters of the content, with `...` appended when cut
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &self.content[..byte_idx]),
            None => self.content.clone(),
        }
    }
}

/// Kind of save request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveKind {
    /// Background save, suppressed when the content equals the head
    Auto,
    /// User-acknowledged save, always appended
    Checkpoint,
}

impl SaveKind {
    pub fn is_checkpoint(self) -> bool {
        matches!(self, SaveKind::Checkpoint)
    }
}

/// Result of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new version was appended and is now the head
    Appended(Version),
    /// Auto-save matched the head content; nothing was written
    Unchanged { head: VersionId },
}

impl SaveOutcome {
    /// The version that holds the saved content after this call
    pub fn version_id(&self) -> VersionId {
        match self {
            SaveOutcome::Appended(version) => version.id,
            SaveOutcome::Unchanged { head } => *head,
        }
    }

    pub fn is_appended(&self) -> bool {
        matches!(self, SaveOutcome::Appended(_))
    }
}

/// What a learner sees when opening an exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Current {
    /// The head of the timeline
    Saved(Version),
    /// No history yet, the subject's starting template
    Template(String),
}

impl Current {
    pub fn content(&self) -> &str {
        match self {
            Current::Saved(version) => &version.content,
            Current::Template(template) => template,
        }
    }

    pub fn version(&self) -> Option<&Version> {
        match self {
            Current::Saved(version) => Some(version),
            Current::Template(_) => None,
        }
    }
}
