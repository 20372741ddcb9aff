//! In-process fake of the portfolio REST API.
//!
//! Every test starts its own backend on an ephemeral port, so state never
//! leaks between tests. Listings deliberately use a different envelope per
//! resource, writes require the bearer token handed out by `login/`, and
//! every write is recorded for inspection.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};

use folio_console::auth::{Credentials, SessionContext, Theme};
use folio_console::client::HttpResourceClient;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "correct-horse";

const FILE_FIELDS: &[&str] = &["image", "pdf_file", "logo", "profile_picture", "resume"];

/// One create/update as the backend received it
#[derive(Debug, Clone)]
pub struct Write {
    pub method: &'static str,
    pub resource: String,
    pub multipart: bool,
    pub fields: Map<String, Value>,
    /// (field, file name, byte length)
    pub files: Vec<(String, String, usize)>,
}

#[derive(Default)]
struct BackendState {
    tables: HashMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
    failing: HashSet<String>,
    writes: Vec<Write>,
    token: String,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let token = encode(
            &Header::default(),
            &json!({ "user_id": 1, "token_type": "access", "exp": 4_102_444_800i64 }),
            &EncodingKey::from_secret(b"fake-backend-secret"),
        )?;
        let state = Arc::new(Mutex::new(BackendState { token, ..Default::default() }));

        let app = Router::new()
            .route("/api/login/", post(login))
            .route("/api/:resource/", get(list).post(create))
            .route("/api/:resource/:id/", put(update).delete(remove))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind fake backend")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url: format!("http://{}/api/", addr), state })
    }

    pub fn token(&self) -> String {
        self.lock().token.clone()
    }

    pub fn seed(&self, resource: &str, rows: Vec<Value>) {
        let mut state = self.lock();
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .collect();
        for row in &rows {
            if let Some(n) = row.get("id").and_then(Value::as_i64) {
                state.next_id = state.next_id.max(n);
            }
        }
        state.tables.insert(resource.to_string(), rows);
    }

    /// Make every request for `resource` answer 500
    pub fn fail(&self, resource: &str) {
        self.lock().failing.insert(resource.to_string());
    }

    pub fn rows(&self, resource: &str) -> Vec<Map<String, Value>> {
        self.lock().tables.get(resource).cloned().unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.lock().writes.clone()
    }

    pub fn last_write(&self) -> Option<Write> {
        self.lock().writes.last().cloned()
    }

    /// Session already holding this backend's token
    pub fn signed_in_session(&self) -> Arc<SessionContext> {
        Arc::new(SessionContext::new(
            Some(Credentials { access: self.token(), refresh: None, username: Some(USERNAME.to_string()) }),
            Theme::Dark,
        ))
    }

    pub fn client(&self, session: Arc<SessionContext>) -> HttpResourceClient {
        HttpResourceClient::new(&self.base_url, Duration::from_secs(5), session).expect("client for fake backend")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().expect("fake backend state")
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn authorized(state: &BackendState, headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", state.token))
        .unwrap_or(false)
}

/// Each resource answers with its own envelope
fn envelope(resource: &str, rows: Vec<Value>) -> Value {
    match resource {
        "projects" => Value::Array(rows),
        "certifications" => json!({ "count": rows.len(), "next": null, "previous": null, "results": rows }),
        "experiences" => json!({ "success": true, "data": { "count": rows.len(), "results": rows } }),
        _ => json!({ "success": true, "data": rows }),
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().expect("fake backend state");
    let ok = body["username"] == USERNAME && body["password"] == PASSWORD;
    if !ok {
        return error(StatusCode::UNAUTHORIZED, json!({ "detail": "No active account found with the given credentials" }));
    }
    Json(json!({
        "code": "LOGIN_SUCCESS",
        "data": { "access": state.token, "refresh": "refresh-token" }
    }))
    .into_response()
}

async fn list(State(state): State<Shared>, Path(resource): Path<String>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("fake backend state");
    if state.failing.contains(&resource) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": format!("{} is down", resource) }));
    }
    // The inbox is private; everything else is public
    if resource == "contacts" && !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "detail": "Authentication credentials were not provided." }));
    }
    let rows: Vec<Value> = state
        .tables
        .get(&resource)
        .map(|t| t.iter().cloned().map(Value::Object).collect())
        .unwrap_or_default();
    Json(envelope(&resource, rows)).into_response()
}

/// Pull fields and files out of a JSON or multipart body
async fn read_body(request: Request) -> Result<(bool, Map<String, Value>, Vec<(String, String, usize)>), Response> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| error(StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })))?;
        let mut fields = Map::new();
        let mut files = Vec::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                    files.push((name, file_name, bytes));
                }
                None => {
                    let text = field.text().await.unwrap_or_default();
                    fields.insert(name, Value::String(text));
                }
            }
        }
        Ok((true, fields, files))
    } else {
        let bytes = to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|e| error(StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => Ok((false, fields, Vec::new())),
            _ => Err(error(StatusCode::BAD_REQUEST, json!({ "message": "Expected a JSON object" }))),
        }
    }
}

fn validate(resource: &str, fields: &Map<String, Value>) -> Option<Response> {
    let required = match resource {
        "projects" | "certifications" => "title",
        "contacts" => "message",
        _ => return None,
    };
    let blank = fields.get(required).and_then(Value::as_str).map(|s| s.trim().is_empty()).unwrap_or(true);
    blank.then(|| error(StatusCode::BAD_REQUEST, json!({ "message": format!("{} is required", required) })))
}

fn apply_write(row: &mut Map<String, Value>, fields: Map<String, Value>, files: &[(String, String, usize)], multipart: bool) {
    for (k, v) in fields {
        // An empty multipart text part clears a file field
        let v = match &v {
            Value::String(s) if multipart && s.is_empty() && FILE_FIELDS.contains(&k.as_str()) => Value::Null,
            _ => v,
        };
        row.insert(k, v);
    }
    for (name, file_name, _) in files {
        row.insert(name.clone(), json!(format!("/media/{}", file_name)));
    }
}

async fn create(State(state): State<Shared>, Path(resource): Path<String>, request: Request) -> Response {
    let headers = request.headers().clone();
    let (multipart, fields, files) = match read_body(request).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let mut state = state.lock().expect("fake backend state");
    // Anyone may post to the contact inbox
    if resource != "contacts" && !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "detail": "Authentication credentials were not provided." }));
    }
    if state.failing.contains(&resource) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": format!("{} is down", resource) }));
    }
    state.writes.push(Write { method: "POST", resource: resource.clone(), multipart, fields: fields.clone(), files: files.clone() });
    if let Some(resp) = validate(&resource, &fields) {
        return resp;
    }

    state.next_id += 1;
    let mut row = Map::new();
    row.insert("id".to_string(), json!(state.next_id));
    apply_write(&mut row, fields, &files, multipart);
    state.tables.entry(resource).or_default().push(row.clone());
    (StatusCode::CREATED, Json(json!({ "code": "CREATED", "data": row }))).into_response()
}

async fn update(State(state): State<Shared>, Path((resource, id)): Path<(String, i64)>, request: Request) -> Response {
    let headers = request.headers().clone();
    let (multipart, fields, files) = match read_body(request).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let mut state = state.lock().expect("fake backend state");
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "detail": "Authentication credentials were not provided." }));
    }
    state.writes.push(Write { method: "PUT", resource: resource.clone(), multipart, fields: fields.clone(), files: files.clone() });
    if let Some(resp) = validate(&resource, &fields) {
        return resp;
    }

    let rows = state.tables.entry(resource).or_default();
    match rows.iter_mut().find(|r| r.get("id").and_then(Value::as_i64) == Some(id)) {
        Some(row) => {
            apply_write(row, fields, &files, multipart);
            Json(json!({ "data": row.clone() })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
    }
}

async fn remove(State(state): State<Shared>, Path((resource, id)): Path<(String, i64)>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("fake backend state");
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "detail": "Authentication credentials were not provided." }));
    }
    if state.failing.contains(&resource) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": format!("{} is down", resource) }));
    }
    let rows = state.tables.entry(resource).or_default();
    let before = rows.len();
    rows.retain(|r| r.get("id").and_then(Value::as_i64) != Some(id));
    if rows.len() == before {
        return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }));
    }
    StatusCode::NO_CONTENT.into_response()
}
