//! Request middleware.

pub mod audit;
pub mod download_gate;

pub use audit::{audit_middleware, client_address, AuditState};
pub use download_gate::{download_gate_middleware, GateState};
