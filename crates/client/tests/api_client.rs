//! Integration tests for the REST client against a stub backend.
//!
//! Each test starts an axum router on an ephemeral port that records
//! every request it receives, then drives [`CrowdsourceApi`] against it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use crowdsource_client::{ApiError, CrowdsourceApi};
use crowdsource_core::module::ModuleStatus;
use crowdsource_core::project::ProjectDraft;
use crowdsource_core::remote::{EntityKind, ModuleBackend, RemoteError, RemoteUpdate};

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn record(State(log): State<Log>, method: Method, uri: Uri, body: Bytes) -> StatusCode {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    log.lock().unwrap().push(Recorded {
        method,
        uri: uri.to_string(),
        body,
    });
    StatusCode::OK
}

async fn module(Path(pk): Path<i64>) -> Result<Json<Value>, StatusCode> {
    if pk == 404 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "id": pk,
        "name": "Prototype Task",
        "status": 1,
        "price": "0.50",
        "repetition": 2,
        "template": [{"name": "template_abc", "template_items": []}],
        "batch_files": []
    })))
}

async fn start_stub() -> (CrowdsourceApi, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/module/{pk}/", get(module).put(record).delete(record))
        .route("/api/module/{pk}/attach_file/", any(record))
        .route("/api/module/{pk}/delete_file/", any(record))
        .route("/api/module/list_by_project/", get(|| async { Json(json!([{"id": 1}, {"id": 2}])) }))
        .route(
            "/api/category/",
            get(|| async { Json(json!([{"id": 1, "name": "Images", "parent": null}])) }),
        )
        .route(
            "/api/project/",
            any(|State(log): State<Log>, method: Method, uri: Uri, body: Bytes| async move {
                record(State(log), method, uri, body).await;
                Json(json!({"id": 10}))
            }),
        )
        .route(
            "/api/module/{pk}/fork/",
            any(|| async { (StatusCode::BAD_REQUEST, "module is not forkable") }),
        )
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (CrowdsourceApi::new(format!("http://{addr}")), log)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retrieve_module_decodes_backend_payload() {
    let (api, _log) = start_stub().await;
    let module = api.retrieve_module(7).await.unwrap();
    assert_eq!(module.id, Some(7));
    assert_eq!(module.price, Some(0.5));
    assert_eq!(module.status, ModuleStatus::Draft);
}

#[tokio::test]
async fn update_sends_only_patch_fields_with_put() {
    let (api, log) = start_stub().await;
    let mut fields = Map::new();
    fields.insert("name".into(), json!("Renamed"));

    RemoteUpdate::update(&api, 7, fields, EntityKind::Module)
        .await
        .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method, Method::PUT);
    assert_eq!(log[0].uri, "/api/module/7/");
    assert_eq!(log[0].body, json!({"name": "Renamed"}));
}

#[tokio::test]
async fn attach_and_delete_file_send_batch_file_body() {
    let (api, log) = start_stub().await;
    ModuleBackend::attach_file(&api, 7, 31).await.unwrap();
    ModuleBackend::delete_file(&api, 7, 31).await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, Method::POST);
    assert_eq!(log[0].uri, "/api/module/7/attach_file/");
    assert_eq!(log[0].body, json!({"batch_file": 31}));
    assert_eq!(log[1].method, Method::DELETE);
    assert_eq!(log[1].uri, "/api/module/7/delete_file/");
    assert_eq!(log[1].body, json!({"batch_file": 31}));
}

#[tokio::test]
async fn delete_module_uses_delete() {
    let (api, log) = start_stub().await;
    ModuleBackend::delete_module(&api, 9).await.unwrap();
    let log = log.lock().unwrap();
    assert_eq!(log[0].method, Method::DELETE);
    assert_eq!(log[0].uri, "/api/module/9/");
}

#[tokio::test]
async fn not_found_maps_to_status_error() {
    let (api, _log) = start_stub().await;
    let err = api.retrieve_module(404).await.unwrap_err();
    assert_matches!(err, RemoteError::Status { status: 404, .. });
}

#[tokio::test]
async fn error_body_is_preserved() {
    let (api, _log) = start_stub().await;
    let err = api.fork(3).await.unwrap_err();
    assert_matches!(err, ApiError::ApiError { status: 400, ref body } if body == "module is not forkable");
}

#[tokio::test]
async fn create_project_posts_draft_payload() {
    let (api, log) = start_stub().await;
    let draft = ProjectDraft {
        name: Some("Birds".into()),
        ..ProjectDraft::blank()
    };
    let created = api.create_project(&draft.new_project_request()).await.unwrap();
    assert_eq!(created["id"], 10);

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, Method::POST);
    assert_eq!(log[0].body["modules"][0]["name"], "Prototype Task");
}

#[tokio::test]
async fn list_endpoints_decode() {
    let (api, _log) = start_stub().await;
    let modules = api.modules_by_project(10).await.unwrap();
    assert_eq!(modules.len(), 2);
    let categories = api.categories().await.unwrap();
    assert_eq!(categories[0].name, "Images");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let api = CrowdsourceApi::new("http://127.0.0.1:1");
    let err = api.retrieve_module(1).await.unwrap_err();
    assert_matches!(err, RemoteError::Transport(_));
}
