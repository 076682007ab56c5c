//! JSON-backed user and customer collections.

mod collection;

use thiserror::Error;

use crate::models::{Customer, User};

pub use collection::{Record, RecordStore};

/// Account store holding every registered user.
pub type UserStore = RecordStore<User>;

/// Customer roster available for quotes.
pub type CustomerStore = RecordStore<Customer>;

/// Failures surfaced by a [`RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same key is already stored.
    #[error("store: a {kind} named {key:?} already exists")]
    AlreadyExists {
        /// Record kind, e.g. `user`.
        kind: &'static str,
        /// Conflicting key.
        key: String,
    },
    /// No record with the key is stored.
    #[error("store: {kind} {key:?} was not found")]
    NotFound {
        /// Record kind, e.g. `customer`.
        kind: &'static str,
        /// Missing key.
        key: String,
    },
    /// Writing the collection to disk failed; the in-memory state was rolled back.
    #[error("store: {0:#}")]
    Persist(#[from] anyhow::Error),
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "user";

    fn key(&self) -> &str {
        &self.username
    }
}

impl Record for Customer {
    const COLLECTION: &'static str = "customers";
    const KIND: &'static str = "customer";

    fn key(&self) -> &str {
        &self.name
    }
}
