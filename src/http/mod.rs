//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, raw target extraction)
//!     → ark::identifier / ark::resolver
//!     → response.rs (redirect, info JSON, error mapping)
//!     → Send to client
//!
//! GET / → negotiate.rs (Accept) → NAAN listing
//! ```

pub mod negotiate;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::AppError;
pub use server::{AppState, HttpServer};
