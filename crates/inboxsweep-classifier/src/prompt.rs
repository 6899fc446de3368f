//! Prompt and output schema sent with every classification request

use inboxsweep_core::{Email, ModelServiceError, Sender};
use serde::Serialize;
use serde_json::{json, Value};

/// System turn shared by every classification request
pub const SYSTEM_PROMPT: &str = r#"You are an email-cleanup assistant focused on reducing digital waste and energy consumption.
Your job is to decide whether an email should be deleted, kept, or reviewed.

Rules:
- Delete obvious promotions, spam, newsletters, and unread bulk emails
- Keep personal, school, work, financial, legal, and account-related emails
- Use REVIEW if unsure
- Be conservative: when in doubt, choose REVIEW
- Output valid JSON only

You must respond with ONLY a JSON object in this exact format, no markdown, no explanation:
{"decision":"DELETE","confidence":0.92,"reason":"Promotional email with no personal or financial relevance."}

decision must be one of: "DELETE", "KEEP", "REVIEW"
confidence must be a number between 0 and 1
reason must be a single sentence

You will receive:
- Sender name and email address
- Subject line
- Date sent
- Whether the email was read
- Email labels (Spam, Promotions, Primary, etc.)
- Whether it has attachments
- Body
"#;

/// Fields of an email the model gets to see
#[derive(Debug, Serialize)]
struct EmailView<'a> {
    id: &'a str,
    from: &'a Sender,
    subject: &'a str,
    body: &'a str,
    labels: &'a [String],
    date: &'a str,
    has_attachment: bool,
    read: bool,
}

/// User turn for one email
pub fn user_prompt(email: &Email) -> Result<String, ModelServiceError> {
    let view = EmailView {
        id: &email.id,
        from: &email.from,
        subject: &email.subject,
        body: &email.body,
        labels: &email.labels,
        date: &email.date,
        has_attachment: email.has_attachment,
        read: email.read,
    };

    let payload =
        serde_json::to_string(&view).map_err(|e| ModelServiceError::transport(e.to_string()))?;
    Ok(format!("Classify this email:\n{}", payload))
}

/// JSON schema constraining the model's reply
pub fn classification_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "decision": { "type": "string", "enum": ["DELETE", "KEEP", "REVIEW"] },
            "confidence": { "type": "number" },
            "reason": { "type": "string" }
        },
        "required": ["decision", "confidence", "reason"]
    })
}
