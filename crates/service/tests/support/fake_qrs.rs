//! In-process stand-in for the QRS endpoints the services use.
//!
//! Records live in memory per entity type as raw JSON. The server checks the
//! xrfkey pairing and the presence of an `X-Qlik-User` header on every call.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

const ENTITY_TYPES: [&str; 3] = ["stream", "user", "app"];

#[derive(Clone, Default)]
struct FakeState {
    records: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

pub struct FakeQrs {
    pub base_url: String,
    state: FakeState,
}

impl FakeQrs {
    pub async fn start() -> anyhow::Result<Self> {
        let state = FakeState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr: SocketAddr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("fake qrs error: {e}");
            }
        });
        Ok(Self { base_url: format!("http://{}:{}", addr.ip(), addr.port()), state })
    }

    /// Insert a record directly, e.g. a source app that tests copy from.
    pub fn seed(&self, entity: &str, mut record: Value) -> Uuid {
        let id = Uuid::new_v4();
        record["id"] = json!(id);
        self.state.records.lock().unwrap().entry(entity.to_string()).or_default().push(record);
        id
    }

    pub fn count(&self, entity: &str) -> usize {
        self.state.records.lock().unwrap().get(entity).map_or(0, Vec::len)
    }
}

async fn handle(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let key = params.get("xrfkey").map(String::as_str);
    let header = headers.get("x-qlik-xrfkey").and_then(|v| v.to_str().ok());
    if key.map_or(true, |k| k.len() != 16) || key != header {
        return reply(StatusCode::FORBIDDEN, json!("XSRF prevention check failed"));
    }
    let Some(caller) = headers.get("x-qlik-user").and_then(|v| v.to_str().ok()).and_then(parse_caller) else {
        return reply(StatusCode::UNAUTHORIZED, json!("missing X-Qlik-User"));
    };

    let body: Option<Value> = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => Some(v),
            Err(e) => return reply(StatusCode::BAD_REQUEST, json!(format!("invalid json: {e}"))),
        }
    };

    let path = uri.path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let mut records = state.records.lock().unwrap();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["qrs", "about", "api", "default", ty]) if known(ty) => reply(StatusCode::OK, template(ty)),
        ("GET", ["qrs", ty]) if known(ty) => list(&records, ty, &params, false),
        ("GET", ["qrs", ty, "full"]) if known(ty) => list(&records, ty, &params, true),
        ("GET", ["qrs", ty, "count"]) if known(ty) => match select(&records, ty, &params) {
            Ok(found) => reply(StatusCode::OK, json!({ "value": found.len() })),
            Err(e) => reply(StatusCode::BAD_REQUEST, json!(e)),
        },
        ("POST", ["qrs", "app", id, "copy"]) => copy_app(&mut records, id, &params, &caller),
        ("PUT", ["qrs", "app", id, "publish"]) => publish_app(&mut records, id, &params),
        ("POST", ["qrs", "app"]) | ("POST", ["qrs", "app", "many"]) => {
            reply(StatusCode::METHOD_NOT_ALLOWED, json!("apps are created by import or copy"))
        }
        ("POST", ["qrs", ty, "many"]) if known(ty) => match body {
            Some(Value::Array(items)) => {
                let mut created = Vec::with_capacity(items.len());
                for item in items {
                    match insert(&mut records, ty, item, &caller) {
                        Ok(record) => created.push(record),
                        Err(resp) => return resp,
                    }
                }
                reply(StatusCode::CREATED, Value::Array(created))
            }
            _ => reply(StatusCode::BAD_REQUEST, json!("expected an array")),
        },
        ("POST", ["qrs", ty]) if known(ty) => match body {
            Some(item) => match insert(&mut records, ty, item, &caller) {
                Ok(record) => reply(StatusCode::CREATED, record),
                Err(resp) => resp,
            },
            None => reply(StatusCode::BAD_REQUEST, json!("missing body")),
        },
        ("GET", ["qrs", ty, id]) if known(ty) => match find(&records, ty, id) {
            Ok(Some(idx)) => reply(StatusCode::OK, records[*ty][idx].clone()),
            Ok(None) => StatusCode::NOT_FOUND.into_response(),
            Err(resp) => resp,
        },
        ("PUT", ["qrs", ty, id]) if known(ty) => update(&mut records, ty, id, body, &caller),
        ("DELETE", ["qrs", ty, id]) if known(ty) => match find(&records, ty, id) {
            Ok(Some(idx)) => {
                if let Some(list) = records.get_mut(*ty) {
                    list.remove(idx);
                }
                StatusCode::NO_CONTENT.into_response()
            }
            Ok(None) => StatusCode::NOT_FOUND.into_response(),
            Err(resp) => resp,
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn known(ty: &str) -> bool {
    ENTITY_TYPES.contains(&ty)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// `UserDirectory=<dir>; UserId=<id>` into `(dir, id)`.
fn parse_caller(header: &str) -> Option<(String, String)> {
    let mut directory = None;
    let mut user = None;
    for part in header.split(';') {
        match part.trim().split_once('=') {
            Some(("UserDirectory", v)) => directory = Some(v.to_string()),
            Some(("UserId", v)) => user = Some(v.to_string()),
            _ => {}
        }
    }
    Some((directory?, user?))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn template(ty: &str) -> Value {
    let mut record = match ty {
        "user" => json!({ "userId": "", "userDirectory": "", "name": "", "roles": [] }),
        "app" => json!({ "name": "", "published": false, "fileSize": 0 }),
        _ => json!({ "name": "" }),
    };
    record["id"] = json!(Uuid::new_v4());
    record
}

fn condensed_fields(ty: &str) -> &'static [&'static str] {
    match ty {
        "user" => &["id", "userId", "userDirectory", "name", "privileges"],
        "app" => &[
            "id",
            "name",
            "appId",
            "publishTime",
            "published",
            "stream",
            "savedInProductVersion",
            "availabilityStatus",
            "privileges",
        ],
        _ => &["id", "name", "privileges"],
    }
}

fn condense(ty: &str, record: &Value) -> Value {
    let fields = condensed_fields(ty);
    match record {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| fields.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn select<'a>(
    records: &'a HashMap<String, Vec<Value>>,
    ty: &str,
    params: &HashMap<String, String>,
) -> Result<Vec<&'a Value>, String> {
    let clauses = match params.get("filter") {
        Some(filter) => parse_filter(filter)?,
        None => Vec::new(),
    };
    Ok(records
        .get(ty)
        .map(|list| list.iter().filter(|r| clauses.iter().all(|c| c.matches(r))).collect())
        .unwrap_or_default())
}

fn list(records: &HashMap<String, Vec<Value>>, ty: &str, params: &HashMap<String, String>, full: bool) -> Response {
    let mut found = match select(records, ty, params) {
        Ok(found) => found,
        Err(e) => return reply(StatusCode::BAD_REQUEST, json!(e)),
    };
    if let Some(order) = params.get("orderby") {
        let (field, desc) = match order.split_once(' ') {
            Some((field, dir)) => (field, dir.eq_ignore_ascii_case("desc")),
            None => (order.as_str(), false),
        };
        found.sort_by_key(|r| lookup(r, field).map(Value::to_string).unwrap_or_default());
        if desc {
            found.reverse();
        }
    }
    let out: Vec<Value> = found
        .into_iter()
        .map(|r| if full { r.clone() } else { condense(ty, r) })
        .collect();
    reply(StatusCode::OK, Value::Array(out))
}

fn find(records: &HashMap<String, Vec<Value>>, ty: &str, id: &str) -> Result<Option<usize>, Response> {
    let id: Uuid = id
        .parse()
        .map_err(|_| reply(StatusCode::BAD_REQUEST, json!(format!("invalid id {id}"))))?;
    Ok(records
        .get(ty)
        .and_then(|list| list.iter().position(|r| r["id"] == json!(id))))
}

fn check_required(ty: &str, record: &Value) -> Result<(), Response> {
    let required: &[&str] = match ty {
        "user" => &["userId", "userDirectory"],
        _ => &["name"],
    };
    for field in required {
        if record[*field].as_str().map_or(true, |v| v.trim().is_empty()) {
            return Err(reply(StatusCode::BAD_REQUEST, json!(format!("{ty}.{field} is required"))));
        }
    }
    Ok(())
}

fn insert(
    records: &mut HashMap<String, Vec<Value>>,
    ty: &str,
    mut record: Value,
    caller: &(String, String),
) -> Result<Value, Response> {
    if !record.is_object() {
        return Err(reply(StatusCode::BAD_REQUEST, json!("expected an object")));
    }
    check_required(ty, &record)?;
    let id = match record["id"].as_str() {
        Some(raw) => raw
            .parse::<Uuid>()
            .map_err(|_| reply(StatusCode::BAD_REQUEST, json!(format!("invalid id {raw}"))))?,
        None => Uuid::new_v4(),
    };
    let list = records.entry(ty.to_string()).or_default();
    if list.iter().any(|r| r["id"] == json!(id)) {
        return Err(reply(StatusCode::CONFLICT, json!(format!("{ty} {id} already exists"))));
    }
    let stamp = now();
    record["id"] = json!(id);
    record["createdDate"] = json!(stamp);
    record["modifiedDate"] = json!(stamp);
    record["modifiedByUserName"] = json!(format!("{}\\{}", caller.0, caller.1));
    list.push(record.clone());
    Ok(record)
}

fn update(
    records: &mut HashMap<String, Vec<Value>>,
    ty: &str,
    id: &str,
    body: Option<Value>,
    caller: &(String, String),
) -> Response {
    let idx = match find(records, ty, id) {
        Ok(Some(idx)) => idx,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(resp) => return resp,
    };
    let Some(mut record) = body.filter(Value::is_object) else {
        return reply(StatusCode::BAD_REQUEST, json!("expected an object"));
    };
    if record["id"].as_str() != Some(id) {
        return reply(StatusCode::BAD_REQUEST, json!("id in body does not match path"));
    }
    if let Err(resp) = check_required(ty, &record) {
        return resp;
    }
    let Some(list) = records.get_mut(ty) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    record["createdDate"] = list[idx]["createdDate"].clone();
    record["modifiedDate"] = json!(now());
    record["modifiedByUserName"] = json!(format!("{}\\{}", caller.0, caller.1));
    list[idx] = record.clone();
    reply(StatusCode::OK, record)
}

fn copy_app(
    records: &mut HashMap<String, Vec<Value>>,
    id: &str,
    params: &HashMap<String, String>,
    caller: &(String, String),
) -> Response {
    let source = match find(records, "app", id) {
        Ok(Some(idx)) => records["app"][idx].clone(),
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(resp) => return resp,
    };
    let mut copy = source;
    if let Some(obj) = copy.as_object_mut() {
        for field in ["id", "publishTime", "stream", "owner"] {
            obj.remove(field);
        }
    }
    copy["published"] = json!(false);
    copy["owner"] = json!({ "userDirectory": caller.0, "userId": caller.1 });
    if let Some(name) = params.get("name") {
        copy["name"] = json!(name);
    }
    match insert(records, "app", copy, caller) {
        Ok(record) => reply(StatusCode::CREATED, record),
        Err(resp) => resp,
    }
}

fn publish_app(records: &mut HashMap<String, Vec<Value>>, id: &str, params: &HashMap<String, String>) -> Response {
    let idx = match find(records, "app", id) {
        Ok(Some(idx)) => idx,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(resp) => return resp,
    };
    let Some(stream_id) = params.get("stream") else {
        return reply(StatusCode::BAD_REQUEST, json!("stream is required"));
    };
    let stream = match find(records, "stream", stream_id) {
        Ok(Some(s)) => condense("stream", &records["stream"][s]),
        Ok(None) => return reply(StatusCode::BAD_REQUEST, json!(format!("stream {stream_id} does not exist"))),
        Err(resp) => return resp,
    };
    let Some(app) = records.get_mut("app").and_then(|list| list.get_mut(idx)) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if app["published"].as_bool() == Some(true) {
        return reply(StatusCode::BAD_REQUEST, json!("app is already published"));
    }
    app["published"] = json!(true);
    app["publishTime"] = json!(now());
    app["stream"] = stream;
    if let Some(name) = params.get("name") {
        app["name"] = json!(name);
    }
    reply(StatusCode::OK, app.clone())
}

/// One `path op value` comparison of a filter expression.
struct Clause {
    path: String,
    op: String,
    value: String,
}

impl Clause {
    fn matches(&self, record: &Value) -> bool {
        let field = lookup(record, &self.path);
        let equal = field.is_some_and(|v| text(v).is_some_and(|t| t.eq_ignore_ascii_case(&self.value)));
        let lower = |v: &Value| text(v).map(|t| t.to_lowercase());
        let needle = self.value.to_lowercase();
        match self.op.as_str() {
            "eq" => equal,
            "ne" => !equal,
            "sw" => field.and_then(lower).is_some_and(|t| t.starts_with(&needle)),
            "so" => field.and_then(lower).is_some_and(|t| t.contains(&needle)),
            _ => false,
        }
    }
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, key| value.get(key))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Clauses joined by `and`; values are `'quoted'` (with `''` escapes) or bare.
fn parse_filter(input: &str) -> Result<Vec<Clause>, String> {
    let mut clauses = Vec::new();
    let mut rest = input.trim();
    loop {
        let (path, after) = rest.split_once(' ').ok_or("filter clause without operator")?;
        let (op, after) = after.trim_start().split_once(' ').ok_or("filter clause without value")?;
        if !["eq", "ne", "sw", "so"].contains(&op) {
            return Err(format!("unsupported operator {op}"));
        }
        let after = after.trim_start();
        let (value, after) = match after.strip_prefix('\'') {
            Some(quoted) => read_quoted(quoted)?,
            None => match after.split_once(' ') {
                Some((value, tail)) => (value.to_string(), tail),
                None => (after.to_string(), ""),
            },
        };
        clauses.push(Clause { path: path.to_string(), op: op.to_string(), value });
        let after = after.trim_start();
        if after.is_empty() {
            return Ok(clauses);
        }
        rest = after
            .strip_prefix("and ")
            .ok_or_else(|| format!("unsupported filter near '{after}'"))?
            .trim_start();
    }
}

fn read_quoted(input: &str) -> Result<(String, &str), String> {
    let mut out = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                out.push('\'');
                chars.next();
                continue;
            }
            return Ok((out, &input[i + 1..]));
        }
        out.push(c);
    }
    Err("unterminated string in filter".to_string())
}
