//! Review session state machine
//!
//! The client walks through dashboard → scanning → review → impact. State is an
//! explicit value: every user action is a function that consumes the current
//! state and returns the next one.

use crate::types::{ClassifiedEmail, Decision, Email, DEFAULT_CONFIDENCE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// CO2 estimate added per kilobyte deleted
pub const CO2_PER_KB: f64 = 0.0001;

/// Reason shown for an email the scan returned nothing for
pub const NO_RESULT_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Dashboard,
    Scanning,
    Review,
    Impact,
}

/// Cumulative impact of confirmed deletions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LifetimeImpact {
    /// CO2 estimate
    pub co2: f64,

    /// Freed storage in kilobytes
    pub storage: f64,
}

impl LifetimeImpact {
    /// Impact after additionally deleting `size_kb` kilobytes
    pub fn add_deleted(self, size_kb: f64) -> Self {
        Self {
            co2: self.co2 + size_kb * CO2_PER_KB,
            storage: self.storage + size_kb,
        }
    }
}

/// One row of the review list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub category: String,
    pub read: bool,
    pub size_kb: f64,
    pub body: String,
    pub decision: Decision,
    pub confidence: f64,
    pub reason: String,
}

impl ReviewItem {
    fn from_email(email: &Email, result: Option<&ClassifiedEmail>) -> Self {
        let category = email
            .labels
            .first()
            .map(|label| label.to_lowercase())
            .unwrap_or_else(|| "inbox".to_string());

        let (decision, confidence, reason) = match result {
            Some(r) => (
                r.classification.decision,
                r.classification.confidence,
                r.classification.reason.clone(),
            ),
            None => (Decision::Review, DEFAULT_CONFIDENCE, NO_RESULT_REASON.to_string()),
        };

        Self {
            id: email.id.clone(),
            from: email.from.display_name().to_string(),
            subject: email.subject.clone(),
            category,
            read: email.read,
            size_kb: email.size_kb,
            body: email.body.clone(),
            decision,
            confidence,
            reason,
        }
    }
}

/// Complete client session state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub page: Page,

    /// Emails of the last completed scan, in scan order
    pub items: Vec<ReviewItem>,

    /// Ids currently marked for deletion
    pub selected: BTreeSet<String>,

    /// Every id deleted during this session
    pub deleted: BTreeSet<String>,

    pub impact: LifetimeImpact,

    /// Number of emails removed by the last confirmation
    pub last_deleted: usize,
}

impl SessionState {
    /// Fresh session starting from a known impact total
    pub fn with_impact(impact: LifetimeImpact) -> Self {
        Self {
            impact,
            ..Default::default()
        }
    }

    pub fn start_scan(self) -> Self {
        Self {
            page: Page::Scanning,
            ..self
        }
    }

    /// Merge scan results into review items and preselect every DELETE
    pub fn finish_scan(self, emails: &[Email], results: &[ClassifiedEmail]) -> Self {
        let by_id: HashMap<&str, &ClassifiedEmail> =
            results.iter().map(|r| (r.email_id.as_str(), r)).collect();

        let items: Vec<ReviewItem> = emails
            .iter()
            .map(|email| ReviewItem::from_email(email, by_id.get(email.id.as_str()).copied()))
            .collect();

        let selected = items
            .iter()
            .filter(|item| item.decision == Decision::Delete)
            .map(|item| item.id.clone())
            .collect();

        Self {
            page: Page::Review,
            items,
            selected,
            ..self
        }
    }

    pub fn scan_failed(self) -> Self {
        Self {
            page: Page::Dashboard,
            items: Vec::new(),
            selected: BTreeSet::new(),
            ..self
        }
    }

    /// Flip the selection of a reviewed email; unknown ids are ignored
    pub fn toggle(mut self, id: &str) -> Self {
        if !self.items.iter().any(|item| item.id == id) {
            return self;
        }

        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self
    }

    pub fn back(self) -> Self {
        Self {
            page: Page::Dashboard,
            ..self
        }
    }

    /// Delete the selected emails and account for their impact
    pub fn confirm_delete(mut self) -> Self {
        let freed_kb: f64 = self
            .items
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .map(|item| item.size_kb)
            .sum();

        let selected = std::mem::take(&mut self.selected);
        self.last_deleted = selected.len();
        self.deleted.extend(selected);
        self.impact = self.impact.add_deleted(freed_kb);
        self.page = Page::Impact;
        self
    }

    /// Number of reviewed emails with the given decision
    pub fn count(&self, decision: Decision) -> usize {
        self.items.iter().filter(|item| item.decision == decision).count()
    }

    /// Total size of the current selection in kilobytes
    pub fn selected_size_kb(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .map(|item| item.size_kb)
            .sum()
    }
}
