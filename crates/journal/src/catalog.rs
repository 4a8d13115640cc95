//! Owner and subject identity
//!
//! The store does not own learner or exercise identity. It asks a
//! [`Directory`] whether both halves of an owner key exist before a save,
//! and for a subject's starting template when a timeline is empty.
//! [`SledCatalog`] keeps that data in the same database as the timelines;
//! [`MemoryDirectory`] is for embedding callers that keep identity elsewhere.

use crate::codec::{decode, encode};
use crate::error::{abort, Result, StoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sled::{Db, Transactional, Tree};
use std::collections::{HashMap, HashSet};
use trail_core::{OwnerId, SubjectId};

/// Identity oracle and template provider
pub trait Directory: Send + Sync {
    fn owner_exists(&self, owner: OwnerId) -> Result<bool>;

    fn subject_exists(&self, subject: SubjectId) -> Result<bool>;

    /// Starting text for a subject, `None` if the subject is unknown
    fn template(&self, subject: SubjectId) -> Result<Option<String>>;
}

/// A learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub created_at: u64,
}

/// An exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub template: String,
    pub created_at: u64,
}

/// Fields for registering a subject
#[derive(Debug, Clone, Default)]
pub struct NewSubject {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub template: String,
}

/// Minimum length of owner and subject names
const MIN_NAME_CHARS: usize = 2;

/// owner_id -> Owner
pub(crate) const OWNERS_TREE: &str = "owners";
/// name -> owner_id
pub(crate) const OWNER_NAMES_TREE: &str = "owner_names";

/// Persistent catalog of owners and subjects
pub struct SledCatalog {
    db: Db,
    owners: Tree,
    owner_names: Tree,
    subjects: Tree,
    subject_names: Tree,
}

impl SledCatalog {
    /// Open the catalog trees inside an existing database
    pub fn open(db: &Db) -> Result<Self> {
        Ok(Self {
            db: db.clone(),
            owners: db.open_tree(OWNERS_TREE)?,
            owner_names: db.open_tree(OWNER_NAMES_TREE)?,
            subjects: db.open_tree("subjects")?,
            subject_names: db.open_tree("subject_names")?,
        })
    }

    /// Register a learner; names are trimmed and must be unique
    pub fn create_owner(&self, name: &str) -> Result<Owner> {
        let name = validate_name("Username", name)?;
        let owner = Owner {
            id: OwnerId(self.db.generate_id()? + 1),
            name,
            created_at: crate::now_ms(),
        };
        let id_bytes = owner.id.0.to_be_bytes();
        let record = encode(&owner)?;

        (&self.owners, &self.owner_names).transaction(|(owners, names)| {
            if names.get(owner.name.as_bytes())?.is_some() {
                return Err(abort(StoreError::Conflict(format!(
                    "Username already exists: {}",
                    owner.name
                ))));
            }
            names.insert(owner.name.as_bytes(), &id_bytes[..])?;
            owners.insert(&id_bytes[..], record.as_slice())?;
            Ok(())
        })?;

        tracing::info!(owner = %owner.id, name = %owner.name, "registered owner");
        Ok(owner)
    }

    pub fn owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        match self.owners.get(id.0.to_be_bytes())? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn owner_by_name(&self, name: &str) -> Result<Option<Owner>> {
        match self.owner_names.get(name.trim().as_bytes())? {
            Some(raw) => self.owner(OwnerId(read_id(&raw)?)),
            None => Ok(None),
        }
    }

    /// All owners in id order
    pub fn owners(&self) -> Result<Vec<Owner>> {
        self.owners
            .iter()
            .values()
            .map(|raw| decode(&raw?))
            .collect()
    }

    /// Register an exercise with its starting template
    pub fn create_subject(&self, new: NewSubject) -> Result<Subject> {
        let name = validate_name("Game name", &new.name)?;
        let display_name = match new.display_name.trim() {
            "" => name.clone(),
            display => display.to_string(),
        };
        let subject = Subject {
            id: SubjectId(self.db.generate_id()? + 1),
            name,
            display_name,
            description: new.description.filter(|d| !d.trim().is_empty()),
            template: new.template,
            created_at: crate::now_ms(),
        };
        let id_bytes = subject.id.0.to_be_bytes();
        let record = encode(&subject)?;

        (&self.subjects, &self.subject_names).transaction(|(subjects, names)| {
            if names.get(subject.name.as_bytes())?.is_some() {
                return Err(abort(StoreError::Conflict(format!(
                    "Game already exists: {}",
                    subject.name
                ))));
            }
            names.insert(subject.name.as_bytes(), &id_bytes[..])?;
            subjects.insert(&id_bytes[..], record.as_slice())?;
            Ok(())
        })?;

        tracing::info!(subject = %subject.id, name = %subject.name, "registered subject");
        Ok(subject)
    }

    pub fn subject(&self, id: SubjectId) -> Result<Option<Subject>> {
        match self.subjects.get(id.0.to_be_bytes())? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn subject_by_name(&self, name: &str) -> Result<Option<Subject>> {
        match self.subject_names.get(name.trim().as_bytes())? {
            Some(raw) => self.subject(SubjectId(read_id(&raw)?)),
            None => Ok(None),
        }
    }

    /// All subjects in id order
    pub fn subjects(&self) -> Result<Vec<Subject>> {
        self.subjects
            .iter()
            .values()
            .map(|raw| decode(&raw?))
            .collect()
    }
}

impl Directory for SledCatalog {
    fn owner_exists(&self, owner: OwnerId) -> Result<bool> {
        Ok(self.owners.contains_key(owner.0.to_be_bytes())?)
    }

    fn subject_exists(&self, subject: SubjectId) -> Result<bool> {
        Ok(self.subjects.contains_key(subject.0.to_be_bytes())?)
    }

    fn template(&self, subject: SubjectId) -> Result<Option<String>> {
        Ok(self.subject(subject)?.map(|s| s.template))
    }
}

fn validate_name(what: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(StoreError::InvalidArgument(format!(
            "{} must be at least {} characters",
            what, MIN_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

fn read_id(raw: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("name index entry of {} bytes", raw.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

/// In-process directory
#[derive(Default)]
pub struct MemoryDirectory {
    owners: RwLock<HashSet<OwnerId>>,
    subjects: RwLock<HashMap<SubjectId, String>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owner(&self, owner: OwnerId) {
        self.owners.write().insert(owner);
    }

    pub fn remove_owner(&self, owner: OwnerId) -> bool {
        self.owners.write().remove(&owner)
    }

    pub fn add_subject(&self, subject: SubjectId, template: impl Into<String>) {
        self.subjects.write().insert(subject, template.into());
    }
}

impl Directory for MemoryDirectory {
    fn owner_exists(&self, owner: OwnerId) -> Result<bool> {
        Ok(self.owners.read().contains(&owner))
    }

    fn subject_exists(&self, subject: SubjectId) -> Result<bool> {
        Ok(self.subjects.read().contains_key(&subject))
    }

    fn template(&self, subject: SubjectId) -> Result<Option<String>> {
        Ok(self.subjects.read().get(&subject).cloned())
    }
}
