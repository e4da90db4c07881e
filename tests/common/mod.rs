#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use journal_api::app::{app, AppState};
use journal_api::config::AppConfig;

pub const SERVICE_KEY: &str = "test-service-role-key";
pub const ALICE_TOKEN: &str = "alice-access-token";
pub const BOB_TOKEN: &str = "bob-access-token";
pub const ALICE_ID: &str = "3b0f6a52-8a8e-4c1e-9f55-0d7f5e2a1a11";
pub const BOB_ID: &str = "9c2d7e14-51b3-4f0a-a6e2-7b8c9d0e1f22";

/// Text the fake store puts in its failure responses; must never reach API callers
pub const STORE_FAULT_TEXT: &str = "could not extend file \"base/16384/2619\": No space left on device";

/// Switches and recorded rows of the fake Supabase project
#[derive(Default)]
pub struct FakeSupabaseState {
    rows: Mutex<Vec<Map<String, Value>>>,
    users: HashMap<String, String>,
    auth_down: AtomicBool,
    fail_inserts: AtomicBool,
    empty_inserts: AtomicBool,
    failing_selects: AtomicUsize,
    select_calls: AtomicUsize,
}

/// Minimal stand-in for Supabase: GoTrue's `/auth/v1/user` and PostgREST's
/// insert and filtered select on `/rest/v1/:table`
pub struct FakeSupabase {
    pub url: String,
    pub state: Arc<FakeSupabaseState>,
}

impl FakeSupabase {
    pub async fn start() -> Result<Self> {
        let mut users = HashMap::new();
        users.insert(ALICE_TOKEN.to_string(), ALICE_ID.to_string());
        users.insert(BOB_TOKEN.to_string(), BOB_ID.to_string());
        let state = Arc::new(FakeSupabaseState {
            users,
            ..Default::default()
        });

        let router = Router::new()
            .route("/auth/v1/user", get(get_user))
            .route("/rest/v1/:table", get(select_rows).post(insert_row))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind fake supabase")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            url: format!("http://{}", addr),
            state,
        })
    }

    pub fn rows(&self) -> Vec<Map<String, Value>> {
        self.state.rows.lock().unwrap().clone()
    }

    pub fn set_auth_down(&self, down: bool) {
        self.state.auth_down.store(down, Ordering::SeqCst);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.state.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_empty_inserts(&self, empty: bool) {
        self.state.empty_inserts.store(empty, Ordering::SeqCst);
    }

    pub fn fail_next_selects(&self, n: usize) {
        self.state.failing_selects.store(n, Ordering::SeqCst);
    }

    pub fn select_calls(&self) -> usize {
        self.state.select_calls.load(Ordering::SeqCst)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_service_call(headers: &HeaderMap) -> bool {
    let bearer = format!("Bearer {}", SERVICE_KEY);
    header(headers, "apikey") == Some(SERVICE_KEY) && header(headers, "authorization") == Some(bearer.as_str())
}

async fn get_user(State(state): State<Arc<FakeSupabaseState>>, headers: HeaderMap) -> Response {
    if state.auth_down.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "upstream connect error").into_response();
    }
    if header(&headers, "apikey") != Some(SERVICE_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "No API key found in request"}))).into_response();
    }

    let token = header(&headers, "authorization").and_then(|v| v.strip_prefix("Bearer "));
    match token.and_then(|t| state.users.get(t)) {
        Some(id) => Json(json!({
            "id": id,
            "aud": "authenticated",
            "role": "authenticated",
            "email": format!("{}@example.com", &id[..8]),
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "code": 401,
                "error_code": "bad_jwt",
                "msg": "invalid JWT: unable to parse or verify signature"
            })),
        )
            .into_response(),
    }
}

/// Render like Postgres does for timestamptz: microseconds, `+00:00`
fn postgres_timestamp(raw: &str) -> Option<String> {
    let dt: DateTime<Utc> = raw.parse().ok()?;
    Some(dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string())
}

async fn insert_row(
    State(state): State<Arc<FakeSupabaseState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(mut row): Json<Map<String, Value>>,
) -> Response {
    if !is_service_call(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid API key"}))).into_response();
    }
    if table != "journal_entries" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "42P01", "message": format!("relation \"public.{}\" does not exist", table)})),
        )
            .into_response();
    }
    if state.fail_inserts.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"code": "53100", "message": STORE_FAULT_TEXT})),
        )
            .into_response();
    }

    let created_at = row
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(postgres_timestamp);
    let Some(created_at) = created_at else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": "22007", "message": "invalid input syntax for type timestamp with time zone"})),
        )
            .into_response();
    };
    row.insert("created_at".into(), Value::String(created_at));
    row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
    state.rows.lock().unwrap().push(row.clone());

    let wants_rows = header(&headers, "prefer") == Some("return=representation");
    if !wants_rows || state.empty_inserts.load(Ordering::SeqCst) {
        return (StatusCode::CREATED, "").into_response();
    }
    (StatusCode::CREATED, Json(json!([row]))).into_response()
}

async fn select_rows(
    State(state): State<Arc<FakeSupabaseState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.select_calls.fetch_add(1, Ordering::SeqCst);
    if !is_service_call(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid API key"}))).into_response();
    }
    let pending = state.failing_selects.load(Ordering::SeqCst);
    if pending > 0 {
        state.failing_selects.store(pending - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded").into_response();
    }
    if table != "journal_entries" {
        return (StatusCode::NOT_FOUND, Json(json!({"code": "42P01"}))).into_response();
    }

    let Some(owner) = params.get("user_id").and_then(|v| v.strip_prefix("eq.")) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "expected user_id filter"}))).into_response();
    };
    if params.get("order").map(String::as_str) != Some("created_at.desc") {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "expected created_at.desc order"}))).into_response();
    }
    let columns: Vec<&str> = params
        .get("select")
        .map(|s| s.split(',').collect())
        .unwrap_or_default();

    let timestamp = |row: &Map<String, Value>| -> Option<DateTime<Utc>> {
        row.get("created_at")?.as_str()?.parse().ok()
    };

    let mut rows: Vec<Map<String, Value>> = state
        .rows
        .lock()
        .unwrap()
        .iter()
        .rev()
        .filter(|row| row.get("user_id").and_then(Value::as_str) == Some(owner))
        .cloned()
        .collect();
    rows.sort_by(|a, b| timestamp(b).cmp(&timestamp(a)));

    let projected: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let picked: Map<String, Value> = row
                .into_iter()
                .filter(|(key, _)| columns.is_empty() || columns.contains(&key.as_str()))
                .collect();
            Value::Object(picked)
        })
        .collect();

    Json(projected).into_response()
}

/// The Journal API, running in-process against a fake Supabase
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub supabase: FakeSupabase,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with(&[]).await
}

pub async fn start_server_with(overrides: &[(&str, &str)]) -> Result<TestServer> {
    let supabase = FakeSupabase::start().await?;

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("SUPABASE_URL".into(), supabase.url.clone());
    vars.insert("SUPABASE_SERVICE_ROLE_KEY".into(), SERVICE_KEY.into());
    vars.insert("STORE_RETRY_BACKOFF_MS".into(), "5".into());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned())?;

    let state = AppState::from_config(&config.store)?;
    let router = app(state, &config);

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        supabase,
    })
}
