//! Fatigue Check - Pre-shift fatigue risk scoring
//!
//! Fatigue Check turns a worker's recent sleep and shift timing into a 0-10
//! fatigue score, a four-level classification and a 24-hour projection
//! through a deterministic pipeline: validation → point scoring →
//! non-decreasing hourly projection → (optional) audit record.
//!
//! ## Modules
//!
//! - **Scoring**: the fixed point-rule table and projection ([`scorer`])
//! - **Audit**: append-only record of completed assessments ([`audit`])
//! - **Surfaces**: JSON API ([`pipeline`]), C bindings ([`ffi`]) and the `fatigue` CLI

pub mod audit;
pub mod clock;
pub mod config;
pub mod error;
pub mod guidelines;
pub mod pipeline;
pub mod scorer;
pub mod types;
pub mod validation;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use audit::{AuditStore, JsonlAuditStore, MemoryAuditStore};
pub use clock::ClockTime;
pub use error::ComputeError;
pub use pipeline::{assess, assess_json, FatigueProcessor};
pub use scorer::FatigueScorer;
pub use types::{AssessmentRecord, FatigueInput, FatigueLevel, FatigueResult, TimeProjection};
pub use validation::ValidationError;

/// Engine version reported by the CLI and FFI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "fatigue-check";
