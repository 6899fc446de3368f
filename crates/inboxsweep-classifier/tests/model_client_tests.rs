//! Model client and health prober against a mock model service

mod common;

use common::{chat_response, email, tags_response, MockTransport};
use inboxsweep_classifier::{
    ChatSettings, EmailClassifier, HealthProbe, OllamaClassifier, OllamaHealthProber, RawResponse,
    DEFAULT_PROBE_TIMEOUT,
};
use inboxsweep_core::parser::UNPARSABLE_REASON;
use inboxsweep_core::{Decision, ModelServiceError};
use std::sync::Arc;
use std::time::Duration;

fn classifier(transport: Arc<MockTransport>) -> OllamaClassifier {
    OllamaClassifier::new(transport, ChatSettings::default())
}

#[tokio::test]
async fn test_well_formed_reply_is_parsed() {
    let transport = Arc::new(MockTransport::new(
        &["mistral:latest"],
        r#"{"decision":"DELETE","confidence":0.92,"reason":"Promotional email."}"#,
    ));

    let result = classifier(transport).classify(&email("e1"), "mistral").await.unwrap();

    assert_eq!(result.decision, Decision::Delete);
    assert_eq!(result.confidence, 0.92);
    assert_eq!(result.reason, "Promotional email.");
}

#[tokio::test]
async fn test_request_shape() {
    let transport = Arc::new(MockTransport::new(&[], r#"{"decision":"KEEP"}"#));

    classifier(transport.clone())
        .classify(&email("e1"), "llama3:8b")
        .await
        .unwrap();

    let bodies = transport.chat_bodies();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];

    assert_eq!(body["model"], "llama3:8b");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .starts_with("Classify this email:\n"));
    assert_eq!(body["format"]["type"], "object");
    assert_eq!(body["options"]["num_predict"], 150);
    assert!((body["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn test_chat_call_uses_configured_timeout() {
    let transport = Arc::new(MockTransport::new(&[], r#"{"decision":"KEEP"}"#));
    let settings = ChatSettings {
        timeout: Duration::from_secs(7),
        ..ChatSettings::default()
    };

    OllamaClassifier::new(transport.clone(), settings)
        .classify(&email("e1"), "mistral")
        .await
        .unwrap();

    assert_eq!(transport.timeouts(), vec![Duration::from_secs(7)]);
}

#[tokio::test]
async fn test_malformed_content_is_not_an_error() {
    let transport = Arc::new(MockTransport::new(&[], "I'd rather not say."));

    let result = classifier(transport).classify(&email("e1"), "mistral").await.unwrap();

    assert_eq!(result.decision, Decision::Review);
    assert_eq!(result.reason, UNPARSABLE_REASON);
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let transport = Arc::new(
        MockTransport::new(&[], "")
            .with_chat(|_| Ok(RawResponse::new(500, "model runner crashed"))),
    );

    let err = classifier(transport).classify(&email("e1"), "mistral").await.unwrap_err();

    assert_eq!(
        err,
        ModelServiceError::Status {
            status: 500,
            body: "model runner crashed".to_string()
        }
    );
}

#[tokio::test]
async fn test_unparsable_body_is_an_error() {
    let transport = Arc::new(
        MockTransport::new(&[], "").with_chat(|_| Ok(RawResponse::new(200, "not json"))),
    );

    let err = classifier(transport).classify(&email("e1"), "mistral").await.unwrap_err();
    assert_eq!(err, ModelServiceError::InvalidBody("not json".to_string()));
}

#[tokio::test]
async fn test_service_error_field_is_an_error() {
    let transport = Arc::new(MockTransport::new(&[], "").with_chat(|_| {
        Ok(RawResponse::new(200, r#"{"error":"model \"nope\" not found"}"#))
    }));

    let err = classifier(transport).classify(&email("e1"), "nope").await.unwrap_err();
    assert!(matches!(err, ModelServiceError::Service(msg) if msg.contains("not found")));
}

#[tokio::test]
async fn test_timeout_propagates() {
    let transport =
        Arc::new(MockTransport::new(&[], "").with_chat(|_| Err(ModelServiceError::Timeout)));

    let err = classifier(transport).classify(&email("e1"), "mistral").await.unwrap_err();
    assert_eq!(err, ModelServiceError::Timeout);
}

#[tokio::test]
async fn test_probe_lists_models_in_service_order() {
    let transport = Arc::new(MockTransport::new(&["llama3:8b", "mistral:latest"], ""));
    let prober = OllamaHealthProber::new(transport.clone());

    let status = prober.probe().await;

    assert!(status.available);
    assert_eq!(status.models, vec!["llama3:8b", "mistral:latest"]);
    assert_eq!(transport.timeouts(), vec![DEFAULT_PROBE_TIMEOUT]);
}

#[tokio::test]
async fn test_probe_with_no_models_is_available() {
    let transport = Arc::new(MockTransport::new(&[], "").with_tags(Ok(tags_response(&[]))));

    let status = OllamaHealthProber::new(transport).probe().await;

    assert!(status.available);
    assert!(status.models.is_empty());
}

#[tokio::test]
async fn test_probe_failures_collapse_to_unavailable() {
    let outcomes = vec![
        Err(ModelServiceError::transport("connection refused")),
        Err(ModelServiceError::Timeout),
        Ok(RawResponse::new(503, "")),
        Ok(RawResponse::new(200, "<html>")),
    ];

    for outcome in outcomes {
        let transport = Arc::new(MockTransport::new(&[], "").with_tags(outcome));
        let status = OllamaHealthProber::new(transport).probe().await;
        assert!(!status.available);
        assert!(status.models.is_empty());
    }
}

#[tokio::test]
async fn test_probe_null_models_is_empty_list() {
    let transport = Arc::new(
        MockTransport::new(&[], "").with_tags(Ok(RawResponse::new(200, r#"{"models":null}"#))),
    );

    let status = OllamaHealthProber::new(transport).probe().await;
    assert!(status.available);
    assert!(status.models.is_empty());
}

#[test]
fn test_chat_response_helper_is_valid_json() {
    let response = chat_response("hi");
    let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(value["message"]["content"], "hi");
}
