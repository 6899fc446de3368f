//! Mock transport and classifiers for testing
//!
//! Provides in-process stand-ins for the model service so client, prober,
//! and batch behaviour can be exercised without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use inboxsweep_classifier::{EmailClassifier, ModelTransport, RawResponse};
use inboxsweep_core::{Classification, Decision, Email, ModelServiceError, Sender};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Route crate logs to the test output; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("inboxsweep_classifier=debug")
        .with_test_writer()
        .try_init();
}

type ChatHandler = Box<dyn Fn(&serde_json::Value) -> Result<RawResponse, ModelServiceError> + Send + Sync>;

/// A scriptable model service
pub struct MockTransport {
    tags: Result<RawResponse, ModelServiceError>,
    chat: ChatHandler,
    chat_bodies: Mutex<Vec<serde_json::Value>>,
    timeouts: Mutex<Vec<Duration>>,
}

impl MockTransport {
    /// Service with the given installed models that answers every chat with `content`
    pub fn new(models: &[&str], content: &str) -> Self {
        let content = content.to_string();
        Self {
            tags: Ok(tags_response(models)),
            chat: Box::new(move |_| Ok(chat_response(&content))),
            chat_bodies: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
        }
    }

    /// Replace the `/api/tags` outcome
    pub fn with_tags(mut self, tags: Result<RawResponse, ModelServiceError>) -> Self {
        self.tags = tags;
        self
    }

    /// Replace the `/api/chat` handler
    pub fn with_chat<F>(mut self, handler: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<RawResponse, ModelServiceError> + Send + Sync + 'static,
    {
        self.chat = Box::new(handler);
        self
    }

    pub fn chat_bodies(&self) -> Vec<serde_json::Value> {
        self.chat_bodies.lock().unwrap().clone()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for MockTransport {
    async fn get_tags(&self, timeout: Duration) -> Result<RawResponse, ModelServiceError> {
        self.timeouts.lock().unwrap().push(timeout);
        self.tags.clone()
    }

    async fn post_chat(
        &self,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, ModelServiceError> {
        self.timeouts.lock().unwrap().push(timeout);
        self.chat_bodies.lock().unwrap().push(body.clone());
        (self.chat)(body)
    }
}

pub fn tags_response(models: &[&str]) -> RawResponse {
    let models: Vec<_> = models
        .iter()
        .map(|name| serde_json::json!({ "name": name, "size": 4_000_000_000u64 }))
        .collect();
    RawResponse::new(200, serde_json::json!({ "models": models }).to_string())
}

pub fn chat_response(content: &str) -> RawResponse {
    RawResponse::new(
        200,
        serde_json::json!({
            "model": "mistral",
            "message": { "role": "assistant", "content": content },
            "done": true
        })
        .to_string(),
    )
}

/// Observed lifecycle of one classify call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Start(String),
    End(String),
}

/// A classifier that records call ordering and concurrency
pub struct RecordingClassifier {
    latency: Duration,
    failing: HashSet<String>,
    events: Mutex<Vec<CallEvent>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingClassifier {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failing: HashSet::new(),
            events: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make calls for these ids fail with a transport error
    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailClassifier for RecordingClassifier {
    async fn classify(
        &self,
        email: &Email,
        _model: &str,
    ) -> Result<Classification, ModelServiceError> {
        self.events.lock().unwrap().push(CallEvent::Start(email.id.clone()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(CallEvent::End(email.id.clone()));

        if self.failing.contains(&email.id) {
            return Err(ModelServiceError::transport("connection reset by peer"));
        }

        Ok(Classification::new(Decision::Delete, 0.9, format!("promo {}", email.id)))
    }
}

pub fn email(id: &str) -> Email {
    Email {
        id: id.to_string(),
        from: Sender::Address {
            name: "Deals".to_string(),
            email: "deals@shop.example".to_string(),
        },
        subject: format!("Offer {}", id),
        body: "Limited time only".to_string(),
        labels: vec!["Promotions".to_string()],
        date: "2024-05-01".to_string(),
        read: false,
        has_attachment: false,
        size_kb: 12.0,
    }
}

pub fn emails(count: usize) -> Vec<Email> {
    (1..=count).map(|i| email(&format!("e{}", i))).collect()
}
