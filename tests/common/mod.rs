#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;

use stockroom::api::{ApiClient, ReqwestTransport};
use stockroom::auth::{Claims, Credential, CredentialStore, MemoryCredentialStore, Session};

/// Nested renderings applied to stored foreign keys: (stored key, rendered key, collection)
const RELATIONS: &[(&str, &str, &str)] = &[
    ("category_id", "category", "categories"),
    ("product_id", "product", "products"),
    ("supplier_id", "supplier", "suppliers"),
];

#[derive(Default)]
struct Backend {
    users: HashMap<String, String>,
    refresh_tokens: Vec<String>,
    collections: HashMap<String, BTreeMap<i64, Value>>,
    next_id: i64,
    /// (method, path, body) of every call after routing
    log: Vec<(String, String, Value)>,
}

/// In-process REST backend on a free local port
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    state: Arc<Mutex<Backend>>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/api/", port);
        let state = Arc::new(Mutex::new(Backend::default()));

        let app = Router::new()
            .fallback(handle)
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test server")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, state })
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.state.lock().unwrap().users.insert(username.to_string(), password.to_string());
    }

    /// Store a record as-is and return its id
    pub fn seed(&self, collection: &str, record: Value) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let mut record = record;
        record["id"] = json!(id);
        state.collections.entry(collection.to_string()).or_default().insert(id, record);
        id
    }

    pub fn stored(&self, collection: &str, id: i64) -> Option<Value> {
        self.state.lock().unwrap().collections.get(collection).and_then(|c| c.get(&id).cloned())
    }

    pub fn count(&self, collection: &str) -> usize {
        self.state.lock().unwrap().collections.get(collection).map_or(0, BTreeMap::len)
    }

    /// Bodies received for `method path`, oldest first
    pub fn bodies(&self, method: &str, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|(m, p, _)| m == method && p == path)
            .map(|(_, _, b)| b.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().log.iter().map(|(m, p, _)| (m.clone(), p.clone())).collect()
    }

    /// Client over real HTTP with an in-memory credential store
    pub fn client(&self, credential: Option<Credential>) -> Result<(ApiClient, Arc<MemoryCredentialStore>)> {
        let store = Arc::new(match credential {
            Some(c) => MemoryCredentialStore::with(c),
            None => MemoryCredentialStore::new(),
        });
        let session = Session::hydrate(store.clone() as Arc<dyn CredentialStore>)?;
        let transport = ReqwestTransport::new(Duration::from_secs(5))?;
        let client = ApiClient::new(&self.base_url, Arc::new(transport), session)?;
        Ok((client, store))
    }

    /// Credential the server accepts for the next hour
    pub fn live_credential(&self) -> Credential {
        let refresh = self.issue_refresh();
        Credential::new(token(chrono::Duration::hours(1)), refresh)
    }

    /// Credential whose access token has expired but whose refresh token is valid
    pub fn stale_credential(&self) -> Credential {
        let refresh = self.issue_refresh();
        Credential::new(token(chrono::Duration::minutes(-5)), refresh)
    }

    fn issue_refresh(&self) -> String {
        let mut state = self.state.lock().unwrap();
        let refresh = format!("refresh-{}", state.refresh_tokens.len());
        state.refresh_tokens.push(refresh.clone());
        refresh
    }
}

pub fn token(offset: chrono::Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        exp: (now + offset).timestamp(),
        iat: Some(now.timestamp()),
        token_type: Some("access".to_string()),
        user_id: Some(1),
        jti: Some(now.timestamp_nanos_opt().unwrap_or_default().to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"integration")).unwrap()
}

fn reply(status: StatusCode, body: Value) -> Response {
    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }
    (status, Json(body)).into_response()
}

fn bearer_is_live(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|t| stockroom::auth::decode_claims(t).ok())
        .is_some_and(|c| !c.is_expired_at(Utc::now()))
}

fn render(state: &Backend, record: &Value) -> Value {
    let Some(obj) = record.as_object() else {
        return record.clone();
    };
    let mut out: Map<String, Value> = obj.clone();
    for (fk, nested, collection) in RELATIONS {
        if let Some(id) = obj.get(*fk).and_then(Value::as_i64) {
            let related = state
                .collections
                .get(*collection)
                .and_then(|c| c.get(&id))
                .map(|r| render(state, r))
                .unwrap_or(Value::Null);
            out.insert(nested.to_string(), related);
        }
    }
    Value::Object(out)
}

async fn handle(
    State(state): State<Arc<Mutex<Backend>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(path) = uri.path().strip_prefix("/api/") else {
        return reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."}));
    };
    let path = path.trim_matches('/').to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.log.push((method.to_string(), path.clone(), body.clone()));

    let segments: Vec<&str> = path.split('/').collect();
    match (method.clone(), segments.as_slice()) {
        (Method::POST, ["token"]) => {
            let user = body["username"].as_str().unwrap_or_default();
            let pass = body["password"].as_str().unwrap_or_default();
            if state.users.get(user).map(String::as_str) == Some(pass) {
                let refresh = format!("refresh-{}", state.refresh_tokens.len());
                state.refresh_tokens.push(refresh.clone());
                reply(
                    StatusCode::OK,
                    json!({"access": token(chrono::Duration::minutes(5)), "refresh": refresh}),
                )
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "No active account found with the given credentials"}),
                )
            }
        }
        (Method::POST, ["token", "refresh"]) => {
            let refresh = body["refresh"].as_str().unwrap_or_default();
            if state.refresh_tokens.iter().any(|t| t == refresh) {
                reply(StatusCode::OK, json!({"access": token(chrono::Duration::minutes(5))}))
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
                )
            }
        }
        (Method::POST, ["user", "register"]) => {
            let user = body["username"].as_str().unwrap_or_default().to_string();
            if user.is_empty() || state.users.contains_key(&user) {
                return reply(
                    StatusCode::BAD_REQUEST,
                    json!({"username": ["A user with that username already exists."]}),
                );
            }
            let pass = body["password"].as_str().unwrap_or_default().to_string();
            state.users.insert(user.clone(), pass);
            reply(StatusCode::CREATED, json!({"username": user}))
        }
        (method, [collection, rest @ ..]) => {
            if !bearer_is_live(&headers) {
                return reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Authentication credentials were not provided."}),
                );
            }
            let collection = collection.to_string();
            match (method, rest) {
                (Method::GET, []) => {
                    let rows: Vec<Value> = state
                        .collections
                        .get(&collection)
                        .map(|c| c.values().map(|r| render(&state, r)).collect())
                        .unwrap_or_default();
                    reply(StatusCode::OK, Value::Array(rows))
                }
                (Method::POST, []) => {
                    if body.get("name").is_some_and(|n| n.as_str().map_or(true, str::is_empty)) {
                        return reply(StatusCode::BAD_REQUEST, json!({"name": ["This field may not be blank."]}));
                    }
                    state.next_id += 1;
                    let id = state.next_id;
                    let mut record = body;
                    record["id"] = json!(id);
                    state.collections.entry(collection).or_default().insert(id, record.clone());
                    reply(StatusCode::CREATED, render(&state, &record))
                }
                (method, [id]) => {
                    let id = id.parse::<i64>().unwrap_or(-1);
                    let Some(existing) = state.collections.get(&collection).and_then(|c| c.get(&id)).cloned() else {
                        return reply(StatusCode::NOT_FOUND, json!({"detail": "No record matches the given query."}));
                    };
                    match method {
                        Method::GET => reply(StatusCode::OK, render(&state, &existing)),
                        Method::PUT => {
                            let mut record = body;
                            record["id"] = json!(id);
                            if let Some(c) = state.collections.get_mut(&collection) {
                                c.insert(id, record.clone());
                            }
                            reply(StatusCode::OK, render(&state, &record))
                        }
                        Method::DELETE => {
                            if let Some(c) = state.collections.get_mut(&collection) {
                                c.remove(&id);
                            }
                            reply(StatusCode::NO_CONTENT, Value::Null)
                        }
                        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"detail": "Method not allowed."})),
                    }
                }
                _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            }
        }
        _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
    }
}
