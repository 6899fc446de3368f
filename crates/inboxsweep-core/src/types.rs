//! Core types for InboxSweep

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a classification reason, in characters
pub const MAX_REASON_CHARS: usize = 200;

/// Confidence used whenever the model gives no usable value
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// An email handed to the classifier by the client
///
/// Emails are owned by the caller and are never mutated while a scan runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Identifier, unique within one scan request
    pub id: String,

    /// Sender, either a bare string or a name/address pair
    #[serde(default)]
    pub from: Sender,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,

    /// Mailbox labels (Spam, Promotions, Primary, ...)
    #[serde(default)]
    pub labels: Vec<String>,

    /// Date the email was sent, as supplied by the client
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub read: bool,

    #[serde(default)]
    pub has_attachment: bool,

    /// Approximate size in kilobytes
    #[serde(default, rename = "sizeKB")]
    pub size_kb: f64,
}

/// Email sender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    /// Display name and address
    Address {
        #[serde(default)]
        name: String,
        #[serde(default)]
        email: String,
    },

    /// Free-form sender string
    Plain(String),
}

impl Sender {
    /// Name to show in listings, falling back to the address
    pub fn display_name(&self) -> &str {
        match self {
            Self::Address { name, email } if name.is_empty() => email,
            Self::Address { name, .. } => name,
            Self::Plain(s) => s,
        }
    }
}

impl Default for Sender {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

/// Three-way outcome of classifying one email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Delete,
    Keep,
    Review,
}

impl Decision {
    /// All decisions, in taxonomy order
    pub const ALL: [Decision; 3] = [Decision::Delete, Decision::Keep, Decision::Review];

    /// Wire name of the decision
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Keep => "KEEP",
            Self::Review => "REVIEW",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    /// Parse an already-uppercased wire name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DELETE" => Ok(Self::Delete),
            "KEEP" => Ok(Self::Keep),
            "REVIEW" => Ok(Self::Review),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// A validated classification
///
/// Confidence is always within `[0, 1]` and the reason never exceeds
/// [`MAX_REASON_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub decision: Decision,
    pub confidence: f64,
    pub reason: String,
}

impl Classification {
    /// Create a classification, enforcing the confidence and reason bounds
    pub fn new(decision: Decision, confidence: f64, reason: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            DEFAULT_CONFIDENCE
        };

        Self {
            decision,
            confidence,
            reason: truncate_chars(&reason.into(), MAX_REASON_CHARS),
        }
    }

    /// A REVIEW classification at default confidence
    pub fn review(reason: impl Into<String>) -> Self {
        Self::new(Decision::Review, DEFAULT_CONFIDENCE, reason)
    }
}

/// Classification result correlated to its email by identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedEmail {
    pub email_id: String,
    pub classification: Classification,
}

impl ClassifiedEmail {
    pub fn new(email_id: impl Into<String>, classification: Classification) -> Self {
        Self {
            email_id: email_id.into(),
            classification,
        }
    }
}

/// Availability of the local model service
///
/// Recomputed on every probe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    pub available: bool,

    /// Installed model names in the order the service reports them
    pub models: Vec<String>,
}

impl HealthStatus {
    /// Service reachable with the given installed models
    pub fn available(models: Vec<String>) -> Self {
        Self {
            available: true,
            models,
        }
    }

    /// Service unreachable
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Body of a scan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub emails: Vec<Email>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Successful scan outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub results: Vec<ClassifiedEmail>,

    /// Model the emails were actually classified with
    pub model: String,

    pub total_processed: usize,
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
