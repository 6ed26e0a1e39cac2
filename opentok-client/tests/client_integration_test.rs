//! Exercises OpenTokClient against an in-process mock of the REST API
//!
//! The mock checks the `X-OPENTOK-AUTH` header on every request and serves
//! a small archive collection so that paging, lookups, stop and delete can
//! be verified without network access.

use assert_matches::assert_matches;
use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use opentok_client::{
    token::ProjectClaims, ArchiveOptions, ArchiveStatus, OpenTokClient, OpenTokConfig,
    OpenTokError, Role, SessionOptions, TokenOptions,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

const API_KEY: &str = "100";
const API_SECRET: &str = "test-secret";
const SESSION_ID: &str = "1_MX4xMDB-fjE2OTk5OTk5OTk5OTl-dGVzdH4";

#[derive(Clone, Default)]
struct MockState {
    archives: Arc<Mutex<Vec<Value>>>,
    session_form: Arc<Mutex<Option<HashMap<String, String>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

// 记录每个请求的方法与原始路径
async fn record_request(State(state): State<MockState>, req: Request, next: Next) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri()));
    next.run(req).await
}

fn archive_json(id: &str, status: &str) -> Value {
    let url = if status == "available" {
        Value::String(format!("https://example.com/{}.mp4", id))
    } else {
        Value::Null
    };
    json!({
        "id": id,
        "status": status,
        "name": "mock archive",
        "sessionId": SESSION_ID,
        "projectId": 100,
        "createdAt": 1700000000000i64,
        "size": 0,
        "duration": 0,
        "outputMode": "composed",
        "hasAudio": true,
        "hasVideo": true,
        "url": url
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    let Some(jwt) = headers.get("X-OPENTOK-AUTH").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mut validation = jsonwebtoken::Validation::default();
    validation.set_issuer(&[API_KEY]);
    jsonwebtoken::decode::<ProjectClaims>(
        jwt,
        &jsonwebtoken::DecodingKey::from_secret(API_SECRET.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.ist == "project")
    .unwrap_or(false)
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"code": 403, "message": "Invalid authentication"})),
    )
        .into_response()
}

async fn create_session(
    State(state): State<MockState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    *state.session_form.lock().unwrap() = Some(form);
    Json(json!([{
        "session_id": SESSION_ID,
        "project_id": "100",
        "create_dt": "Tue Nov 14 22:13:20 PST 2023",
        "media_server_url": ""
    }]))
    .into_response()
}

#[derive(Deserialize)]
struct Paging {
    offset: usize,
    count: usize,
}

async fn list_archives(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let archives = state.archives.lock().unwrap();
    let items: Vec<Value> = archives
        .iter()
        .skip(paging.offset)
        .take(paging.count)
        .cloned()
        .collect();
    Json(json!({"count": archives.len(), "items": items})).into_response()
}

async fn start_archive(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    if body["sessionId"] != SESSION_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Session not found"})),
        )
            .into_response();
    }
    let mut archive = archive_json("started-1", "started");
    archive["name"] = body["name"].clone();
    archive["outputMode"] = body["outputMode"].clone();
    state.archives.lock().unwrap().insert(0, archive.clone());
    Json(archive).into_response()
}

async fn find_archive(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_key, id)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let archives = state.archives.lock().unwrap();
    match archives.iter().find(|a| a["id"] == id.as_str()) {
        Some(archive) => Json(archive.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Archive not found"})),
        )
            .into_response(),
    }
}

async fn delete_archive(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_key, id)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let mut archives = state.archives.lock().unwrap();
    let before = archives.len();
    archives.retain(|a| a["id"] != id.as_str());
    if archives.len() == before {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Archive not found"})),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn stop_archive(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_key, id)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let mut archives = state.archives.lock().unwrap();
    match archives.iter_mut().find(|a| a["id"] == id.as_str()) {
        Some(archive) if archive["status"] == "started" => {
            archive["status"] = json!("stopped");
            Json(archive.clone()).into_response()
        }
        Some(_) => (
            StatusCode::CONFLICT,
            Json(json!({"message": "Archive is not recording"})),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Archive not found"})),
        )
            .into_response(),
    }
}

async fn start_mock(state: MockState) -> String {
    let app = Router::new()
        .route("/session/create", post(create_session))
        .route(
            "/v2/project/{key}/archive",
            get(list_archives).post(start_archive),
        )
        .route(
            "/v2/project/{key}/archive/{id}",
            get(find_archive).delete(delete_archive),
        )
        .route("/v2/project/{key}/archive/{id}/stop", post(stop_archive))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str) -> OpenTokClient {
    OpenTokClient::new(
        OpenTokConfig::new(API_KEY, API_SECRET)
            .with_api_url(base_url)
            .with_timeout(5),
    )
    .unwrap()
}

fn seeded_state(n: usize) -> MockState {
    let state = MockState::default();
    {
        let mut archives = state.archives.lock().unwrap();
        for i in 0..n {
            archives.push(archive_json(&format!("archive-{}", i), "available"));
        }
    }
    state
}

#[tokio::test]
async fn creates_routed_session() {
    let state = MockState::default();
    let client = client_for(&start_mock(state.clone()).await);

    let session = client
        .create_session(&SessionOptions::default())
        .await
        .unwrap();
    assert_eq!(session.session_id, SESSION_ID);
    assert_eq!(session.project_id.as_deref(), Some("100"));

    let form = state.session_form.lock().unwrap().clone().unwrap();
    assert_eq!(form["archiveMode"], "manual");
    assert_eq!(form["p2p.preference"], "disabled");
    assert!(!form.contains_key("location"));

    let token = client
        .generate_token(&session.session_id, &TokenOptions::with_role(Role::Moderator))
        .unwrap();
    assert!(token.starts_with("T1=="));
}

#[tokio::test]
async fn lists_one_page_with_total() {
    let client = client_for(&start_mock(seeded_state(12)).await);

    let page = client.list_archives(10, 5).await.unwrap();
    assert_eq!(page.count, 12);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "archive-10");
    assert!(page.items[0].is_downloadable());
}

#[tokio::test]
async fn archive_lifecycle() {
    let client = client_for(&start_mock(MockState::default()).await);

    let options = ArchiveOptions {
        name: Some("Rust Archiving Sample App".to_string()),
        ..Default::default()
    };
    let archive = client.create_archive(SESSION_ID, &options).await.unwrap();
    assert_eq!(archive.status, ArchiveStatus::Started);
    assert_eq!(archive.name.as_deref(), Some("Rust Archiving Sample App"));

    let found = client.find_archive(&archive.id).await.unwrap();
    assert_eq!(found, archive);

    let stopped = client.stop_archive(&archive.id).await.unwrap();
    assert_eq!(stopped.status, ArchiveStatus::Stopped);

    // 已停止的录制不能再次停止
    assert_matches!(
        client.stop_archive(&archive.id).await,
        Err(OpenTokError::Api { status: 409, .. })
    );

    client.delete_archive(&archive.id).await.unwrap();
    assert_matches!(
        client.find_archive(&archive.id).await,
        Err(OpenTokError::NotFound(message)) if message == "Archive not found"
    );
}

#[tokio::test]
async fn start_for_unknown_session_is_not_found() {
    let client = client_for(&start_mock(MockState::default()).await);

    assert_matches!(
        client
            .create_archive("2_unknown", &ArchiveOptions::default())
            .await,
        Err(OpenTokError::NotFound(_))
    );
    assert_matches!(
        client.create_archive("", &ArchiveOptions::default()).await,
        Err(OpenTokError::InvalidArgument(_))
    );
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let base_url = start_mock(seeded_state(1)).await;
    let client = OpenTokClient::new(
        OpenTokConfig::new(API_KEY, "not-the-secret").with_api_url(base_url),
    )
    .unwrap();

    assert_matches!(
        client.list_archives(0, 5).await,
        Err(OpenTokError::Api { status: 403, message }) if message == "Invalid authentication"
    );
}

#[test]
fn missing_credentials_are_a_configuration_error() {
    assert_matches!(
        OpenTokClient::new(OpenTokConfig::new("", "")),
        Err(OpenTokError::Configuration(_))
    );
}

#[tokio::test]
async fn reserved_characters_stay_inside_the_archive_segment() {
    let state = seeded_state(1);
    let client = client_for(&start_mock(state.clone()).await);

    for id in ["abc/stop", "../../../../session/create", "x?offset=0"] {
        assert_matches!(
            client.delete_archive(id).await,
            Err(OpenTokError::NotFound(_)),
            "{}",
            id
        );
    }
    assert_matches!(
        client.stop_archive("archive-0#frag").await,
        Err(OpenTokError::NotFound(_))
    );
    assert_matches!(
        client.find_archive("a/b?c").await,
        Err(OpenTokError::NotFound(_))
    );
    assert_matches!(
        client.delete_archive("..").await,
        Err(OpenTokError::InvalidArgument(_))
    );

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            "DELETE /v2/project/100/archive/abc%2Fstop".to_string(),
            "DELETE /v2/project/100/archive/..%2F..%2F..%2F..%2Fsession%2Fcreate".to_string(),
            "DELETE /v2/project/100/archive/x%3Foffset=0".to_string(),
            "POST /v2/project/100/archive/archive-0%23frag/stop".to_string(),
            "GET /v2/project/100/archive/a%2Fb%3Fc".to_string(),
        ]
    );

    // 原有归档未受影响
    assert_eq!(state.archives.lock().unwrap().len(), 1);
}
