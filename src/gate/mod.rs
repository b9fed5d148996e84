//! Download gate subsystem.
//!
//! # Data Flow
//! ```text
//! Request (path + headers)
//!     → download.rs (is this a download attempt?)
//!     → signals.rs (user agent, referrer, header score, proof cookie)
//!     → evaluator.rs (ordered checks)
//!     → AccessDecision: Allow | Deny(reason) | Challenge
//! ```
//!
//! # Design Decisions
//! - Pure and synchronous: reads only the request and fixed config
//! - Every step is toggleable; a disabled step always passes
//! - No session state: the challenge outcome rides on a client cookie
//! - Every deny carries a distinct reason

pub mod challenge;
pub mod decision;
pub mod download;
pub mod evaluator;
pub mod signals;
pub mod user_agent;

pub use challenge::{challenge_page, has_proof_cookie, PROOF_COOKIE};
pub use decision::{AccessDecision, DenyReason};
pub use download::normalize_path;
pub use evaluator::evaluate;
pub use signals::ClassifierSignals;
