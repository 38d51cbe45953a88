//! ARK identifier handling.
//!
//! # Data Flow
//! ```text
//! raw request target ("ark:/12345/x7?info")
//!     → identifier.rs (grammar match, byte spans)
//!     → ArkIdentifier { naan, remainder, arkpid, pid }
//!     → resolver.rs (record lookup, info check, placeholder substitution)
//!     → Resolution::Redirect(url) | Resolution::Info(record)
//! ```

pub mod identifier;
pub mod resolver;

pub use identifier::{ArkIdentifier, ParseError, ParsedParts};
pub use resolver::{Resolution, ResolveError, Resolver, DEFAULT_INFO_MARKERS};
