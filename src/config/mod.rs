//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - A missing `[download_check]` table disables every check
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ContentConfig;
pub use schema::DownloadCheckConfig;
pub use schema::GateConfig;
pub use schema::GeoConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
