//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResolverConfig (validated, immutable)
//!     → passed to HttpServer::new alongside the record store
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ResolverConfig;
pub use schema::{
    CorsConfig, ListenerConfig, ListingConfig, LogFormat, ObservabilityConfig, ResolutionConfig,
    StoreConfig, TimeoutConfig,
};
