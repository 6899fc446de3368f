//! Bounded-concurrency classification of an email list
//!
//! Emails are split into consecutive groups. All calls in a group run
//! concurrently and the whole group is joined before the next one starts, so
//! at most `batch_size` requests are ever in flight against the service.

use crate::client::EmailClassifier;
use futures::future::join_all;
use inboxsweep_core::{Classification, ClassifiedEmail, Email};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Emails classified concurrently per group
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Reason attached to an email whose classification call failed
pub const CALL_FAILED_REASON: &str = "LLM classification failed - marked for manual review.";

/// Classifies whole email lists group by group
#[derive(Clone)]
pub struct BatchClassifier {
    classifier: Arc<dyn EmailClassifier>,
    batch_size: usize,
}

impl BatchClassifier {
    /// Create a batch classifier; a zero batch size is treated as one
    pub fn new(classifier: Arc<dyn EmailClassifier>, batch_size: usize) -> Self {
        Self {
            classifier,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Classify every email exactly once, in input order
    ///
    /// Never fails: an email whose call errors out is marked for review.
    pub async fn classify_all(&self, emails: &[Email], model: &str) -> Vec<ClassifiedEmail> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(emails.len());

        for (index, group) in emails.chunks(self.batch_size).enumerate() {
            debug!("Classifying group {} ({} emails)", index + 1, group.len());

            let calls = group.iter().map(|email| self.classify_isolated(email, model));
            results.extend(join_all(calls).await);
        }

        info!(
            "Classified {} emails with {} in {:?}",
            results.len(),
            model,
            start.elapsed()
        );

        results
    }

    async fn classify_isolated(&self, email: &Email, model: &str) -> ClassifiedEmail {
        let classification = match self.classifier.classify(email, model).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Classification of {} failed: {}", email.id, e);
                metrics::counter!("inboxsweep_model_failures_total").increment(1);
                Classification::review(CALL_FAILED_REASON)
            }
        };

        metrics::counter!(
            "inboxsweep_classifications_total",
            "decision" => classification.decision.as_str()
        )
        .increment(1);

        ClassifiedEmail::new(email.id.clone(), classification)
    }
}
