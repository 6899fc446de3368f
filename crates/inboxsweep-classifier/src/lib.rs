//! InboxSweep Classifier
//!
//! Classification of emails by a locally running Ollama service.
//!
//! This crate provides:
//! - A transport seam over the service's HTTP API
//! - The fixed system prompt and reply schema
//! - A per-email model client that feeds replies through the core parser
//! - A health prober listing installed models
//! - A batch classifier with bounded, group-wise concurrency

pub mod batch;
pub mod client;
pub mod health;
pub mod prompt;
pub mod transport;

pub use batch::{BatchClassifier, CALL_FAILED_REASON, DEFAULT_BATCH_SIZE};
pub use client::{ChatSettings, EmailClassifier, OllamaClassifier};
pub use health::{HealthProbe, OllamaHealthProber, DEFAULT_PROBE_TIMEOUT};
pub use transport::{HttpTransport, ModelTransport, RawResponse, DEFAULT_BASE_URL};
