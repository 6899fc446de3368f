//! Built-in sample inbox

use inboxsweep_core::Email;

const SAMPLE_INBOX: &str = include_str!("../fixtures/emails.json");

/// The sample emails shipped with the binary
pub fn sample_emails() -> serde_json::Result<Vec<Email>> {
    serde_json::from_str(SAMPLE_INBOX)
}
