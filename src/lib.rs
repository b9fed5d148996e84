//! Download gate: decides per request whether a protected file is served,
//! denied, or put behind a script challenge, and enriches audit logs with
//! cached client geolocation.

pub mod config;
pub mod gate;
pub mod geo;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use gate::{evaluate, AccessDecision, DenyReason};
pub use geo::{GeoCache, GeoEntry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
