//! ARK (Archival Resource Key) NAAN resolver library

pub mod ark;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use ark::{ArkIdentifier, Resolution, Resolver};
pub use config::schema::ResolverConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{AuthorityRecord, FileRecordStore, MemoryRecordStore, RecordStore};
