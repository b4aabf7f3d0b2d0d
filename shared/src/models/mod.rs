//! Data models
//!
//! Mirrors the JSON served by the warehouse backend.
//! All IDs are `i64`; quantities that may carry fractions use `Decimal`.

pub mod adjustment;
pub mod order;
pub mod product;

// Re-exports
pub use adjustment::*;
pub use order::*;
pub use product::*;

/// Error returned when a status string does not name a known status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}
