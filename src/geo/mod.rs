//! Geolocation enrichment subsystem.
//!
//! # Data Flow
//! ```text
//! client address
//!     → cache.rs (hit: refresh access time, return)
//!     → provider.rs on miss (HTTP JSON lookup, bounded by a timeout)
//!     → GeoEntry stored (location or Unknown), oldest entry evicted if full
//! ```
//!
//! # Design Decisions
//! - Used for audit logging only; never consulted by the download gate
//! - Failures are cached as `Unknown` to bound outbound calls
//! - One lock guards the map and its access clock; network I/O happens
//!   outside it

pub mod cache;
pub mod provider;

pub use cache::GeoCache;
pub use provider::{GeoEntry, GeoLocation, GeoProvider, HttpGeoProvider, LookupError};
