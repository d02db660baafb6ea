use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use dms_server::{build_app, ServerConfig, SESSION_HEADER};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::tempdir;
use tower::ServiceExt;

const ARTICLE: &str = "Journal of Testing, Vol. 3\n\
Author: Jane Doe\n\
Search engines rank documents by how often query words appear.\n\
Titles weigh more than body text when ranking results.\n\
Keywords give the strongest signal for a ranking match.\n\
Summaries sit between titles and body text in importance.";

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Body) -> (StatusCode, Bytes) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(SESSION_HEADER, t);
    }
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn call_json(app: &Router, method: Method, uri: &str, token: Option<&str>, value: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let req = match token {
        Some(t) => req.header(SESSION_HEADER, t),
        None => req,
    };
    let resp = app.clone().oneshot(req.body(Body::from(value.to_string())).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login_as(app: &Router, username: &str) -> String {
    let (status, _) = call_json(
        app,
        Method::POST,
        "/auth/register",
        None,
        json!({ "username": username, "email": format!("{username}@example.com"), "password": "s3cret" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call_json(app, Method::POST, "/auth/login", None, json!({ "username": username, "password": "s3cret" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].get("password_hash").is_none());
    body["token"].as_str().unwrap().to_string()
}

async fn wait_for_status(app: &Router, token: &str, id: u64) -> Value {
    for _ in 0..100 {
        let (status, body) = call(app, Method::GET, &format!("/documents/{id}"), Some(token), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body).unwrap();
        if doc["processing_status"] != "Processing" && doc["processing_status"] != "Pending" {
            return doc;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("document {id} never finished processing");
}

fn app_in(dir: &std::path::Path) -> Router {
    build_app(ServerConfig::new(dir.to_string_lossy().to_string())).unwrap()
}

#[tokio::test]
async fn health_and_analysis_need_no_session() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());

    let (status, body) = call(&app, Method::GET, "/health", None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");

    let (status, body) = call(&app, Method::POST, "/analyze/summary", None, Body::from("")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["summary"], "İçerik bulunamadı.");

    let (status, body) = call(&app, Method::POST, "/analyze/keywords", None, Body::from(ARTICLE)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["keywords"].as_str().unwrap().contains("ranking"));
}

#[tokio::test]
async fn documents_require_a_session() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());
    let (status, _) = call(&app, Method::GET, "/documents", None, Body::empty()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, Method::GET, "/search?q=rust", Some("bogus"), Body::empty()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_bad_login_fails() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());
    login_as(&app, "alice").await;

    let (status, _) = call_json(
        &app,
        Method::POST,
        "/auth/register",
        None,
        json!({ "username": "alice", "email": "other@example.com", "password": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call_json(&app, Method::POST, "/auth/login", None, json!({ "username": "alice", "password": "wrong" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_process_search_and_delete() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());
    let alice = login_as(&app, "alice").await;
    let bob = login_as(&app, "bob").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/documents?title=Ranking%20notes&file_name=notes.txt",
        Some(&alice),
        Body::from(ARTICLE),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body).unwrap();
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["uploaded_by"], "alice");

    let doc = wait_for_status(&app, &alice, id).await;
    assert_eq!(doc["processing_status"], "Completed");
    assert!(!doc["summary"].as_str().unwrap().contains("Author:"));

    let (status, body) = call(&app, Method::GET, "/search?q=ranking", Some(&bob), Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 1);
    let hit = &json["results"][0];
    assert_eq!(hit["document_id"].as_u64().unwrap(), id);
    assert!(hit["relevance_score"].as_f64().unwrap() >= 10.0);
    assert!(hit["highlighted_content"].as_str().unwrap().contains("<mark>ranking</mark>"));

    let (status, _) = call(&app, Method::DELETE, &format!("/documents/{id}"), Some(&bob), Body::empty()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::DELETE, &format!("/documents/{id}"), Some(&alice), Body::empty()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &format!("/documents/{id}"), Some(&alice), Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_unsupported_uploads_and_foreign_renames() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());
    let alice = login_as(&app, "alice").await;

    let (status, _) = call(&app, Method::POST, "/documents?title=Pic&file_name=pic.png", Some(&alice), Body::from("x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::POST, "/documents?title=Old&file_name=a.txt", Some(&alice), Body::from(ARTICLE)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = serde_json::from_slice::<Value>(&body).unwrap()["id"].as_u64().unwrap();

    let mallory = login_as(&app, "mallory").await;
    let (status, _) = call_json(&app, Method::PUT, &format!("/documents/{id}"), Some(&mallory), json!({ "title": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, doc) = call_json(&app, Method::PUT, &format!("/documents/{id}"), Some(&alice), json!({ "title": "New" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["title"], "New");

    let (status, _) = call_json(&app, Method::PUT, "/documents/9999", Some(&alice), json!({ "title": "New" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_ends_session() {
    let dir = tempdir().unwrap();
    let app = app_in(dir.path());
    let alice = login_as(&app, "alice").await;

    let (status, _) = call(&app, Method::POST, "/auth/logout", Some(&alice), Body::empty()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, "/documents", Some(&alice), Body::empty()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
