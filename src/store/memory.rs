//! In-memory record store.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{AuthorityRecord, RecordStore, StoreError};

/// A fixed set of records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, AuthorityRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, validating each one.
    pub fn from_records(
        records: impl IntoIterator<Item = AuthorityRecord>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Add a record, keyed by its own `naan`.
    pub fn insert(&mut self, record: AuthorityRecord) -> Result<(), StoreError> {
        let checked = if record.naan.is_empty() {
            Err("naan is empty".to_string())
        } else {
            record.check()
        };
        checked.map_err(|reason| StoreError::InvalidRecord {
            naan: record.naan.clone(),
            reason,
        })?;
        self.records.insert(record.naan.clone(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, naan: &str) -> Result<Option<AuthorityRecord>, StoreError> {
        Ok(self.records.get(naan).cloned())
    }

    async fn naans(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let store = MemoryRecordStore::from_records([
            AuthorityRecord::new("12345", "https://a.example/$pid"),
            AuthorityRecord::new("67890", "https://b.example/$arkpid"),
        ])
        .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("12345").await.unwrap().is_some());
        assert!(store.get("1234").await.unwrap().is_none());
        assert!(store.get("012345").await.unwrap().is_none());
        assert_eq!(store.naans().await.unwrap(), vec!["12345", "67890"]);
    }

    #[test]
    fn test_insert_rejects_invalid_record() {
        let mut store = MemoryRecordStore::new();
        let err = store
            .insert(AuthorityRecord::new("12345", "https://x/$pid/$arkpid"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { ref naan, .. } if naan == "12345"));

        let err = store.insert(AuthorityRecord::new("", "https://x/$pid")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { ref reason, .. } if reason == "naan is empty"));
        assert!(store.is_empty());
    }
}
