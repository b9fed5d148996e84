//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (assign/propagate request ID)
//!     → middleware/audit.rs (time the request, log after response)
//!     → middleware/download_gate.rs (allow / deny / challenge)
//!     → content.rs (static files, attachment disposition)
//!     → Send to client
//! ```

pub mod content;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
