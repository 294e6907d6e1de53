use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::api::{ApiClient, HttpRequest, HttpResponse, Transport};
use crate::auth::{decode_claims, Claims, Credential, MemoryCredentialStore, Session};
use crate::error::ApiError;
use crate::types::{lock, Method};

pub const BASE_URL: &str = "http://fake.local/api/";

/// Signed access token expiring `offset` from now
pub fn mint_token(offset: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        exp: (now + offset).timestamp(),
        iat: Some(now.timestamp()),
        token_type: Some("access".to_string()),
        user_id: Some(1),
        jti: Some(format!("{}", now.timestamp_nanos_opt().unwrap_or_default())),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

pub fn memory_session(credential: Option<Credential>) -> (Session, Arc<MemoryCredentialStore>) {
    let store = Arc::new(match credential {
        Some(c) => MemoryCredentialStore::with(c),
        None => MemoryCredentialStore::new(),
    });
    let session = Session::hydrate(store.clone()).unwrap();
    (session, store)
}

pub fn client_with<T: Transport + 'static>(transport: T, credential: Option<Credential>) -> ApiClient {
    let (session, _) = memory_session(credential);
    ApiClient::new(BASE_URL, Arc::new(transport), session).unwrap()
}

/// Credential whose access token is valid for another hour
pub fn live_credential() -> Credential {
    Credential::new(mint_token(Duration::hours(1)), "refresh-seed")
}

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, ApiError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, serde_json::to_vec(&body).unwrap());
    }

    pub fn push_raw(&self, status: u16, body: Vec<u8>) {
        lock(&self.responses).push_back(Ok(HttpResponse { status, body }));
    }

    pub fn push_network_error(&self, message: &str) {
        lock(&self.responses).push_back(Err(ApiError::Network(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

// ---------------------------------------------------------------------------
// In-memory REST backend
// ---------------------------------------------------------------------------

/// Write-only foreign keys the backend expands into nested records on read
const RELATIONS: &[(&str, &str, &str)] = &[
    ("category_id", "category", "categories"),
    ("product_id", "product", "products"),
    ("supplier_id", "supplier", "suppliers"),
];

const NAMED: &[&str] = &["categories", "products", "suppliers"];

#[derive(Default)]
struct FakeState {
    collections: BTreeMap<String, BTreeMap<i64, Value>>,
    next_id: i64,
    users: BTreeMap<String, String>,
    refresh_tokens: BTreeSet<String>,
    failures: VecDeque<(Method, String, u16, Value)>,
    log: Vec<(Method, String)>,
}

/// Transport that behaves like the inventory REST API
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str, password: &str) {
        lock(&self.state).users.insert(username.to_string(), password.to_string());
    }

    pub fn accept_refresh(&self, token: &str) {
        lock(&self.state).refresh_tokens.insert(token.to_string());
    }

    /// Insert a stored record directly and return its id
    pub fn seed(&self, collection: &str, record: Value) -> i64 {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let id = state.next_id;
        let mut record = record;
        record["id"] = json!(id);
        state.collections.entry(collection.to_string()).or_default().insert(id, record);
        id
    }

    /// Raw stored body of a record, write-only keys included
    pub fn stored(&self, collection: &str, id: i64) -> Option<Value> {
        lock(&self.state).collections.get(collection).and_then(|c| c.get(&id)).cloned()
    }

    pub fn count(&self, collection: &str) -> usize {
        lock(&self.state).collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    /// Answer the next matching request with `status`/`body` instead
    pub fn fail_next(&self, method: Method, path: &str, status: u16, body: Value) {
        lock(&self.state)
            .failures
            .push_back((method, path.trim_matches('/').to_string(), status, body));
    }

    /// Every request seen, as (method, path relative to the API root)
    pub fn log(&self) -> Vec<(Method, String)> {
        lock(&self.state).log.clone()
    }

    fn handle(&self, request: &HttpRequest) -> (u16, Value) {
        let path = request
            .url
            .path()
            .trim_start_matches("/api/")
            .trim_matches('/')
            .to_string();
        let mut state = lock(&self.state);
        state.log.push((request.method, path.clone()));

        if let Some(pos) = state
            .failures
            .iter()
            .position(|(m, p, _, _)| *m == request.method && *p == path)
        {
            if let Some((_, _, status, body)) = state.failures.remove(pos) {
                return (status, body);
            }
        }

        let segments: Vec<&str> = path.split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method, segments.as_slice()) {
            (Method::Post, ["token"]) => {
                let user = body["username"].as_str().unwrap_or_default();
                let pass = body["password"].as_str().unwrap_or_default();
                if state.users.get(user).map(String::as_str) == Some(pass) {
                    let refresh = format!("refresh-{}-{}", user, state.refresh_tokens.len());
                    state.refresh_tokens.insert(refresh.clone());
                    (200, json!({"access": mint_token(Duration::minutes(5)), "refresh": refresh}))
                } else {
                    (401, json!({"detail": "No active account found with the given credentials"}))
                }
            }
            (Method::Post, ["token", "refresh"]) => {
                let refresh = body["refresh"].as_str().unwrap_or_default();
                if state.refresh_tokens.contains(refresh) {
                    (200, json!({"access": mint_token(Duration::minutes(5))}))
                } else {
                    (401, json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}))
                }
            }
            (Method::Post, ["user", "register"]) => {
                let user = body["username"].as_str().unwrap_or_default().to_string();
                if user.is_empty() {
                    return (400, json!({"username": ["This field is required."]}));
                }
                if state.users.contains_key(&user) {
                    return (400, json!({"username": ["A user with that username already exists."]}));
                }
                let pass = body["password"].as_str().unwrap_or_default().to_string();
                state.users.insert(user.clone(), pass);
                (201, json!({"id": state.users.len(), "username": user}))
            }
            (method, [collection, rest @ ..]) => {
                if !authorized(request.bearer.as_deref()) {
                    return (401, json!({"detail": "Authentication credentials were not provided."}));
                }
                let collection = collection.to_string();
                match (method, rest) {
                    (Method::Get, []) => {
                        let rows: Vec<Value> = state
                            .collections
                            .get(&collection)
                            .map(|c| c.values().map(|r| render(&state, r)).collect())
                            .unwrap_or_default();
                        (200, Value::Array(rows))
                    }
                    (Method::Post, []) => {
                        if let Some(err) = validate(&collection, &body) {
                            return (400, err);
                        }
                        state.next_id += 1;
                        let id = state.next_id;
                        let mut record = body;
                        record["id"] = json!(id);
                        state.collections.entry(collection.clone()).or_default().insert(id, record.clone());
                        (201, render(&state, &record))
                    }
                    (method, [id]) => {
                        let Ok(id) = id.parse::<i64>() else {
                            return (404, json!({"detail": "Not found."}));
                        };
                        let exists = state.collections.get(&collection).is_some_and(|c| c.contains_key(&id));
                        if !exists {
                            return (404, json!({"detail": "No record matches the given query."}));
                        }
                        match method {
                            Method::Get => {
                                let record = state.collections[&collection][&id].clone();
                                (200, render(&state, &record))
                            }
                            Method::Put => {
                                if let Some(err) = validate(&collection, &body) {
                                    return (400, err);
                                }
                                let mut record = body;
                                record["id"] = json!(id);
                                if let Some(c) = state.collections.get_mut(&collection) {
                                    c.insert(id, record.clone());
                                }
                                (200, render(&state, &record))
                            }
                            Method::Delete => {
                                if let Some(c) = state.collections.get_mut(&collection) {
                                    c.remove(&id);
                                }
                                (204, Value::Null)
                            }
                            Method::Post => (405, json!({"detail": "Method \"POST\" not allowed."})),
                        }
                    }
                    _ => (404, json!({"detail": "Not found."})),
                }
            }
            _ => (404, json!({"detail": "Not found."})),
        }
    }
}

fn authorized(bearer: Option<&str>) -> bool {
    bearer
        .and_then(|t| decode_claims(t).ok())
        .is_some_and(|c| !c.is_expired_at(Utc::now()))
}

fn validate(collection: &str, body: &Value) -> Option<Value> {
    if !body.is_object() {
        return Some(json!({"non_field_errors": ["Invalid data. Expected a dictionary."]}));
    }
    if NAMED.contains(&collection) && body["name"].as_str().map_or(true, str::is_empty) {
        return Some(json!({"name": ["This field is required."]}));
    }
    None
}

fn render(state: &FakeState, record: &Value) -> Value {
    let Some(obj) = record.as_object() else {
        return record.clone();
    };
    let mut out: Map<String, Value> = obj.clone();
    for (fk, nested, collection) in RELATIONS {
        if let Some(value) = out.remove(*fk) {
            let related = value
                .as_i64()
                .and_then(|id| state.collections.get(*collection).and_then(|c| c.get(&id)))
                .map(|r| render(state, r))
                .unwrap_or(Value::Null);
            out.insert(nested.to_string(), related);
        }
    }
    Value::Object(out)
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let (status, body) = self.handle(&request);
        let body = if body.is_null() { Vec::new() } else { serde_json::to_vec(&body).unwrap() };
        Ok(HttpResponse { status, body })
    }
}
