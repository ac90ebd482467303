use httpmock::prelude::*;
use serde_json::json;

use ragask::{QueryForm, QueryMode, RagClient, RequestState, FALLBACK_MESSAGE};

#[tokio::test]
async fn test_contract_law_question() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body(json!({ "query": "What is contract law?", "mode": "hybrid" }));
            then.status(200)
                .json_body(json!({ "answer": "Contract law governs..." }));
        })
        .await;

    let client = RagClient::new(&server.base_url());
    let mut form = QueryForm::new(QueryMode::default());
    form.input = "What is contract law?".to_string();

    let status = form.submit(&client).await;

    mock.assert_async().await;
    assert_eq!(status, RequestState::Succeeded);
    assert_eq!(form.display_text(), Some("Contract law governs..."));
}

#[tokio::test]
async fn test_server_failure_then_recovery() {
    let server = MockServer::start_async().await;
    let mut failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(503).body("overloaded");
        })
        .await;

    let client = RagClient::new(&server.base_url());
    let mut form = QueryForm::new(QueryMode::Global);
    form.input = "Define consideration".to_string();

    assert_eq!(form.submit(&client).await, RequestState::Failed);
    assert_eq!(form.display_text(), Some(FALLBACK_MESSAGE));
    assert_eq!(form.state().error_code, Some("server"));
    assert!(form.can_submit());

    failing.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200)
                .json_body(json!({ "status": "success", "data": "Something of value exchanged." }));
        })
        .await;

    assert_eq!(form.submit(&client).await, RequestState::Succeeded);
    assert_eq!(form.display_text(), Some("Something of value exchanged."));
    assert!(form.state().error_message.is_none());
}

#[tokio::test]
async fn test_blank_question_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).json_body(json!({ "data": "unused" }));
        })
        .await;

    let client = RagClient::new(&server.base_url());
    let mut form = QueryForm::new(QueryMode::Hybrid);
    form.input = "    ".to_string();

    assert_eq!(form.submit(&client).await, RequestState::Idle);
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_attachment_from_disk_is_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nda.txt");
    std::fs::write(&path, "Confidential information means...").unwrap();

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .body_contains("filename=\"nda.txt\"")
                .body_contains("Confidential information means...")
                .body_contains("local");
            then.status(200).json_body(json!({ "data": "It is mutual." }));
        })
        .await;

    let client = RagClient::new(&server.base_url()).with_attachments(true);
    let mut form = QueryForm::new(QueryMode::Local);
    form.input = "Is this NDA mutual?".to_string();
    form.attachment_path = Some(path);

    assert_eq!(form.submit(&client).await, RequestState::Succeeded);
    mock.assert_async().await;
    assert_eq!(form.display_text(), Some("It is mutual."));
}
