// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Persistent Store
//!
//! Durable key-value persistence behind the [`StateStore`] trait: one JSON
//! payload per collection, last-write-wins. `SledStore` is the durable
//! backend; `InMemoryStore` serves development and tests, mirroring the
//! in-memory/durable repository pairs used elsewhere in the platform.
//!
//! Callers own fallback semantics: a missing or corrupt payload must never
//! surface as an error to the review pipeline (see
//! `application::state::GovernanceState`).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Collections persisted by the governance dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Agents,
    Cases,
    ApprovedResponses,
    ApprovedPatterns,
    AuditEvents,
    MonitoredResponses,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Agents => "agents",
            Collection::Cases => "cases",
            Collection::ApprovedResponses => "approved-responses",
            Collection::ApprovedPatterns => "approved-patterns",
            Collection::AuditEvents => "audit-events",
            Collection::MonitoredResponses => "monitored-responses",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Abstract durable store: `get` a collection's raw payload, `set` it whole.
pub trait StateStore: Send + Sync {
    fn get(&self, collection: Collection) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, collection: Collection, payload: Vec<u8>) -> Result<(), StoreError>;
}

/// Durable store backed by a sled embedded database.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Ephemeral database, removed on drop. Used by tests and `--ephemeral`
    /// CLI runs.
    pub fn temporary() -> Result<Self, StoreError> {
        Ok(Self {
            db: sled::Config::new().temporary(true).open()?,
        })
    }
}

impl StateStore for SledStore {
    fn get(&self, collection: Collection) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(collection.key())?.map(|v| v.to_vec()))
    }

    fn set(&self, collection: Collection, payload: Vec<u8>) -> Result<(), StoreError> {
        self.db.insert(collection.key(), payload)?;
        Ok(())
    }
}

/// Volatile store for development and tests.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<Collection, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStore {
    fn get(&self, collection: Collection) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(&collection).cloned())
    }

    fn set(&self, collection: Collection, payload: Vec<u8>) -> Result<(), StoreError> {
        self.entries.lock().insert(collection, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sled_store_round_trips_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path().join("state")).unwrap();
        assert!(store.get(Collection::Cases).unwrap().is_none());

        store
            .set(Collection::Cases, br#"[{"id":"case-1"}]"#.to_vec())
            .unwrap();
        assert_eq!(
            store.get(Collection::Cases).unwrap().unwrap(),
            br#"[{"id":"case-1"}]"#.to_vec()
        );
    }

    #[test]
    fn in_memory_store_overwrites_in_place() {
        let store = InMemoryStore::new();
        store.set(Collection::Agents, b"[1]".to_vec()).unwrap();
        store.set(Collection::Agents, b"[2]".to_vec()).unwrap();
        assert_eq!(store.get(Collection::Agents).unwrap().unwrap(), b"[2]");
    }
}
