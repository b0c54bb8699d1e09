#![allow(clippy::disallowed_methods)]

use std::error::Error;
use std::sync::Arc;

use actors::{LifecycleConfig, NoopNotifier, PrintDesk};
use api::create_router;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use storage::DocumentStore;
use tower::ServiceExt;

const BOUNDARY: &str = "printflow-test-boundary";

async fn test_app() -> Result<Router, Box<dyn Error>> {
    let (desk, _handle) = PrintDesk::start(
        LifecycleConfig::default(),
        DocumentStore::memory(),
        Arc::new(NoopNotifier),
    )
    .await?;
    Ok(create_router(desk))
}

/// Multipart body with text fields and an optional file part named `document`.
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((file_name, contents)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn submit_request(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/jobs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json(response: Response<Body>) -> Result<Value, Box<dyn Error>> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn submit(app: &Router, submitter: &str, file_name: &str) -> Result<u64, Box<dyn Error>> {
    let response = app
        .clone()
        .oneshot(submit_request(
            &[("submitterName", submitter), ("paperSize", "A4")],
            Some((file_name, "contents")),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    json(response).await?["ticketId"]
        .as_u64()
        .ok_or_else(|| "missing ticketId".into())
}

#[tokio::test]
async fn test_health() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let response = app.oneshot(get("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_submit_returns_created_ticket() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(submit_request(
            &[
                ("student_id", "studentA"),
                ("paper_size", "A3"),
                ("color_mode", "Color"),
                ("orientation", "Landscape"),
            ],
            Some(("notes.docx", "hello")),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json(response).await?;
    assert_eq!(body["ticketId"], 1001);
    assert_eq!(body["documentName"], "notes.docx");
    assert_eq!(body["status"], "Queued");

    let jobs = json(app.oneshot(get("/jobs")).await?).await?;
    let job = &jobs[0];
    assert_eq!(job["id"], 1001);
    assert_eq!(job["submitterName"], "studentA");
    assert_eq!(job["options"]["paperSize"], "A3");
    assert_eq!(job["options"]["colorMode"], "Color");
    assert_eq!(job["options"]["orientation"], "Landscape");
    Ok(())
}

#[tokio::test]
async fn test_submit_without_file_or_submitter_is_bad_request() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(submit_request(&[("submitterName", "studentA")], None))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json(response).await?["error"].is_string());

    let response = app
        .clone()
        .oneshot(submit_request(&[], Some(("a.pdf", "x"))))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(submit_request(
            &[("submitterName", "studentA"), ("paperSize", "B5")],
            Some(("a.pdf", "x")),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_unstorable_document_name_is_bad_request() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(submit_request(
            &[("submitterName", "studentA")],
            Some(("Lab [final] #2.pdf", "x")),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let jobs = json(app.oneshot(get("/jobs")).await?).await?;
    assert_eq!(jobs.as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_submission_conflicts() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    submit(&app, "a", "notes.docx").await?;

    let response = app
        .oneshot(submit_request(
            &[("submitterName", "b")],
            Some(("notes.docx", "other")),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_list_is_newest_first() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let a = submit(&app, "studentA", "a.pdf").await?;
    let b = submit(&app, "studentB", "b.pdf").await?;

    let jobs = json(app.oneshot(get("/jobs")).await?).await?;
    let ids: Vec<u64> = jobs
        .as_array()
        .ok_or("expected array")?
        .iter()
        .filter_map(|j| j["id"].as_u64())
        .collect();
    assert_eq!(ids, vec![b, a]);
    Ok(())
}

#[tokio::test]
async fn test_transitions_and_status_codes() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let id = submit(&app, "studentA", "a.pdf").await?;

    let response = app.clone().oneshot(post(&format!("/jobs/{id}/complete"))).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(post(&format!("/jobs/{id}/accept"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["status"], "Printing");

    let response = app.clone().oneshot(post(&format!("/jobs/{id}/complete"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["status"], "ReadyForPickup");

    let response = app.clone().oneshot(post(&format!("/jobs/{id}/reject"))).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(post("/jobs/9999/accept")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(post("/jobs/abc/accept")).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_get_job_by_ticket() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let id = submit(&app, "studentA", "a.pdf").await?;

    let response = app.clone().oneshot(get(&format!("/jobs/{id}"))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["documentName"], "a.pdf");

    let response = app.oneshot(get("/jobs/4242")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_rename_with_json_and_form_bodies() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let id = submit(&app, "studentA", "essay.pdf").await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/jobs/{id}/rename"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"newName": "report"}"#))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["documentName"], "report.pdf");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/jobs/{id}/rename"))
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("new_name=final"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await?["documentName"], "final.pdf");

    let response = app.clone().oneshot(get("/documents/final.pdf")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/pdf"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"contents");

    let response = app.oneshot(get("/documents/essay.pdf")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_rename_after_accept_conflicts() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let id = submit(&app, "studentA", "essay.pdf").await?;
    app.clone().oneshot(post(&format!("/jobs/{id}/accept"))).await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/jobs/{id}/rename"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"newName": "report"}"#))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/documents/essay.pdf")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_missing_document_is_not_found() -> Result<(), Box<dyn Error>> {
    let app = test_app().await?;
    let response = app.oneshot(get("/documents/nothing.pdf")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(json(response).await?["error"].is_string());
    Ok(())
}
