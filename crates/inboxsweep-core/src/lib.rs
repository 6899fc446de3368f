//! InboxSweep Core
//!
//! Core types, error types, and pure logic shared across InboxSweep components.
//!
//! This crate provides:
//! - The email and classification data model
//! - Error types for model-service calls and the scan boundary
//! - A total parser from raw model replies to classifications
//! - The review session state machine used by clients

pub mod error;
pub mod parser;
pub mod session;
pub mod types;

pub use error::{ModelServiceError, ScanError};
pub use parser::parse_classification;
pub use session::{LifetimeImpact, Page, ReviewItem, SessionState};
pub use types::{
    Classification, ClassifiedEmail, Decision, Email, HealthStatus, ScanRequest, ScanResponse,
    Sender,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ModelServiceError, ScanError};
    pub use crate::parser::parse_classification;
    pub use crate::types::{Classification, ClassifiedEmail, Decision, Email, HealthStatus};
}
