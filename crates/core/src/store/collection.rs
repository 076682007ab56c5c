use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use super::StoreError;
use crate::models::{Role, User};

/// A record kind persisted as one named array inside a JSON document.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Top-level key of the array in the JSON document.
    const COLLECTION: &'static str;
    /// Singular name used in error messages.
    const KIND: &'static str;

    /// Unique key identifying the record.
    fn key(&self) -> &str;
}

/// Ordered collection of records mirrored to a JSON file after every change.
#[derive(Debug)]
pub struct RecordStore<R> {
    path: PathBuf,
    records: Vec<R>,
}

impl<R: Record> RecordStore<R> {
    /// Load the collection at `path`. A missing file yields an empty collection.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            read_collection(&path)?
        } else {
            debug!(path = %path.display(), kind = R::KIND, "collection file missing, starting empty");
            Vec::new()
        };
        Ok(Self { path, records })
    }

    /// File backing this collection.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by key.
    pub fn find(&self, key: &str) -> Option<&R> {
        self.records.iter().find(|record| record.key() == key)
    }

    /// Append a record with a previously unused key.
    pub fn add(&mut self, record: R) -> Result<(), StoreError> {
        if self.find(record.key()).is_some() {
            return Err(StoreError::AlreadyExists {
                kind: R::KIND,
                key: record.key().to_string(),
            });
        }
        let key = record.key().to_string();
        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err.into());
        }
        info!(kind = R::KIND, key = %key, "record added");
        Ok(())
    }

    /// Remove the record sharing `record`'s key, keeping the others in order.
    pub fn remove(&mut self, record: &R) -> Result<R, StoreError> {
        let index = self.position(record.key())?;
        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            return Err(err.into());
        }
        info!(kind = R::KIND, key = %removed.key(), "record removed");
        Ok(removed)
    }

    fn position(&self, key: &str) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|candidate| candidate.key() == key)
            .ok_or_else(|| StoreError::NotFound {
                kind: R::KIND,
                key: key.to_string(),
            })
    }

    fn persist(&self) -> Result<()> {
        write_collection(&self.path, &self.records)
    }
}

impl RecordStore<User> {
    /// Change the role of an existing user.
    pub fn set_role(&mut self, user: &User, role: Role) -> Result<(), StoreError> {
        let index = self.position(&user.username)?;
        let previous = std::mem::replace(&mut self.records[index].role, role);
        if let Err(err) = self.persist() {
            self.records[index].role = previous;
            return Err(err.into());
        }
        info!(username = %user.username, from = %previous, to = %role, "role changed");
        Ok(())
    }
}

fn read_collection<R: Record>(path: &Path) -> Result<Vec<R>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut document: HashMap<String, Vec<R>> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document.remove(R::COLLECTION).unwrap_or_default())
}

fn write_collection<R: Record>(path: &Path, records: &[R]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let document = BTreeMap::from([(R::COLLECTION, records)]);
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut serializer)
        .with_context(|| format!("failed to serialize {}", R::COLLECTION))?;
    buffer.push(b'\n');
    fs::write(path, buffer).with_context(|| format!("failed to write {}", path.display()))
}
