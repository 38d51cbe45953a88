//! Authority record storage.
//!
//! # Data Flow
//! ```text
//! Resolver
//!     → RecordStore::get(naan)
//!         → fs.rs (<data_dir>/<naan>.json, cached after first read)
//!         → memory.rs (in-process map)
//!     → Option<AuthorityRecord>
//! ```
//!
//! # Design Decisions
//! - Stores are read-only at request time
//! - Absence is `Ok(None)`, never an error
//! - I/O and decoding failures surface as `StoreError` (5xx upstream)

pub mod fs;
pub mod memory;
pub mod record;

use async_trait::async_trait;

pub use fs::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use record::{AuthorityRecord, Placeholder};

/// Errors raised by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record for NAAN {naan}: {reason}")]
    InvalidRecord { naan: String, reason: String },
}

/// Read-only lookup of authority records keyed by NAAN.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Fetch the record registered for `naan`, if any.
    async fn get(&self, naan: &str) -> Result<Option<AuthorityRecord>, StoreError>;

    /// All registered NAANs, in listing order. File stores keep the key
    /// order of `index.json`; memory stores list in ascending order.
    async fn naans(&self) -> Result<Vec<String>, StoreError>;
}

/// True when `naan` is a plausible NAAN key (ASCII digits only).
pub(crate) fn is_naan_key(naan: &str) -> bool {
    !naan.is_empty() && naan.bytes().all(|b| b.is_ascii_digit())
}
