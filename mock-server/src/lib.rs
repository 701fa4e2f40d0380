//! In-memory stand-in for the Telegram Bot API.
//!
//! Serves `/bot{token}/{method}` and `/file/bot{token}/{path}` with the same
//! envelope format as the real service. State lives behind a `std` mutex so
//! tests can seed and inspect it from synchronous code; it is never held
//! across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, warn};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub date: i64,
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct File {
    pub file_id: String,
    pub file_size: i64,
    pub file_path: String,
}

/// One request as the server saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub http_method: String,
    pub api_method: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug)]
struct BotApiState {
    token: String,
    me: User,
    updates: Vec<Update>,
    next_update_id: i64,
    next_message_id: i64,
    files: HashMap<String, (File, Vec<u8>)>,
    sent: Vec<Message>,
    requests: Vec<RecordedRequest>,
    rate_limit: Option<i64>,
}

/// Shared handle to the mock's state. Clones see the same state.
#[derive(Clone, Debug)]
pub struct MockBotApi {
    state: Arc<Mutex<BotApiState>>,
}

impl MockBotApi {
    /// A mock that accepts only `token`. The bot's user id is the token's
    /// numeric prefix, as with real tokens.
    pub fn new(token: &str) -> Self {
        let id = token
            .split(':')
            .next()
            .and_then(|prefix| prefix.parse().ok())
            .unwrap_or(1);
        let state = BotApiState {
            token: token.to_string(),
            me: User {
                id,
                is_bot: true,
                first_name: "Mock Bot".to_string(),
                username: Some("mock_bot".to_string()),
            },
            updates: Vec::new(),
            next_update_id: 1,
            next_message_id: 1,
            files: HashMap::new(),
            sent: Vec::new(),
            requests: Vec::new(),
            rate_limit: None,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BotApiState> {
        // A panicking test must not poison the mock for the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn me(&self) -> User {
        self.lock().me.clone()
    }

    /// Queue an incoming text message from a private chat. Returns its update id.
    pub fn push_text_update(&self, chat_id: i64, text: &str) -> i64 {
        let mut state = self.lock();
        let update_id = state.next_update_id;
        let message_id = state.next_message_id;
        state.next_update_id += 1;
        state.next_message_id += 1;
        state.updates.push(Update {
            update_id,
            message: Some(Message {
                message_id,
                from: Some(User {
                    id: chat_id,
                    is_bot: false,
                    first_name: "Tester".to_string(),
                    username: None,
                }),
                date: 1_700_000_000 + update_id,
                chat: Chat {
                    id: chat_id,
                    kind: "private".to_string(),
                },
                text: Some(text.to_string()),
            }),
        });
        update_id
    }

    /// Make `content` available through `getFile(file_id)` and the file route.
    pub fn add_file(&self, file_id: &str, file_path: &str, content: &[u8]) {
        let file = File {
            file_id: file_id.to_string(),
            file_size: content.len() as i64,
            file_path: file_path.to_string(),
        };
        self.lock()
            .files
            .insert(file_id.to_string(), (file, content.to_vec()));
    }

    /// Answer the next API call with 429 and `retry_after`.
    pub fn rate_limit_next(&self, retry_after: i64) {
        self.lock().rate_limit = Some(retry_after);
    }

    pub fn sent_messages(&self) -> Vec<Message> {
        self.lock().sent.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }
}

pub fn app(api: MockBotApi) -> Router {
    Router::new()
        .route("/{bot_token}/{method}", get(call_method).post(call_method))
        .route("/file/{bot_token}/{*file_path}", get(download_file))
        .with_state(api)
}

pub async fn run(listener: TcpListener, api: MockBotApi) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api)).await
}

fn ok(result: impl Serialize) -> Response {
    (StatusCode::OK, Json(json!({"ok": true, "result": result}))).into_response()
}

fn fail(status: StatusCode, description: &str) -> Response {
    let body = json!({
        "ok": false,
        "error_code": status.as_u16(),
        "description": description,
    });
    (status, Json(body)).into_response()
}

fn authorized(state: &BotApiState, bot_token: &str) -> bool {
    bot_token.strip_prefix("bot") == Some(state.token.as_str())
}

async fn call_method(
    State(api): State<MockBotApi>,
    Path((bot_token, method)): Path<(String, String)>,
    http_method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = String::from_utf8_lossy(&body).into_owned();

    let mut state = api.lock();
    state.requests.push(RecordedRequest {
        http_method: http_method.to_string(),
        api_method: method.clone(),
        content_type,
        body: body.clone(),
    });

    if !authorized(&state, &bot_token) {
        warn!(method = %method, "rejected call with unknown token");
        return fail(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    if let Some(retry_after) = state.rate_limit.take() {
        let body = json!({
            "ok": false,
            "error_code": 429,
            "description": format!("Too Many Requests: retry after {retry_after}"),
            "parameters": {"retry_after": retry_after},
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    let params: Map<String, Value> = if body.is_empty() {
        Map::new()
    } else {
        match serde_json::from_str(&body) {
            Ok(params) => params,
            Err(_) => return fail(StatusCode::BAD_REQUEST, "Bad Request: invalid JSON body"),
        }
    };

    debug!(method = %method, params = params.len(), "handling call");
    match method.as_str() {
        "getMe" => ok(&state.me),
        "getUpdates" => get_updates(&mut state, &params),
        "getFile" => get_file(&state, &params),
        "sendMessage" => send_message(&mut state, &params),
        _ => fail(StatusCode::NOT_FOUND, "Not Found"),
    }
}

fn get_updates(state: &mut BotApiState, params: &Map<String, Value>) -> Response {
    let offset = params.get("offset").and_then(Value::as_i64);
    let limit = params
        .get("limit")
        .and_then(Value::as_u64)
        .unwrap_or(100)
        .clamp(1, 100) as usize;

    // An offset confirms every update before it.
    if let Some(offset) = offset {
        state.updates.retain(|u| u.update_id >= offset);
    }
    let batch: Vec<&Update> = state.updates.iter().take(limit).collect();
    ok(batch)
}

fn get_file(state: &BotApiState, params: &Map<String, Value>) -> Response {
    let Some(file_id) = params.get("file_id").and_then(Value::as_str) else {
        return fail(StatusCode::BAD_REQUEST, "Bad Request: file_id is required");
    };
    match state.files.get(file_id) {
        Some((file, _)) => ok(file),
        None => fail(StatusCode::BAD_REQUEST, "Bad Request: invalid file_id"),
    }
}

fn send_message(state: &mut BotApiState, params: &Map<String, Value>) -> Response {
    let Some(chat_id) = params.get("chat_id").and_then(Value::as_i64) else {
        return fail(StatusCode::BAD_REQUEST, "Bad Request: chat not found");
    };
    let text = params.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Bad Request: message text is empty");
    }

    let message = Message {
        message_id: state.next_message_id,
        from: Some(state.me.clone()),
        date: 1_700_000_000,
        chat: Chat {
            id: chat_id,
            kind: "private".to_string(),
        },
        text: Some(text.to_string()),
    };
    state.next_message_id += 1;
    state.sent.push(message.clone());
    ok(message)
}

async fn download_file(
    State(api): State<MockBotApi>,
    Path((bot_token, file_path)): Path<(String, String)>,
) -> Response {
    let state = api.lock();
    if !authorized(&state, &bot_token) {
        return fail(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    match state.files.values().find(|(file, _)| file.file_path == file_path) {
        Some((_, content)) => (StatusCode::OK, content.clone()).into_response(),
        None => fail(StatusCode::NOT_FOUND, "Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_id_comes_from_token_prefix() {
        assert_eq!(MockBotApi::new("424242:secret").me().id, 424242);
        assert_eq!(MockBotApi::new("not-numeric").me().id, 1);
    }

    #[test]
    fn token_check_requires_bot_prefix() {
        let api = MockBotApi::new("1:abc");
        let state = api.lock();
        assert!(authorized(&state, "bot1:abc"));
        assert!(!authorized(&state, "1:abc"));
        assert!(!authorized(&state, "bot1:abd"));
    }

    #[test]
    fn pushed_updates_get_increasing_ids() {
        let api = MockBotApi::new("1:abc");
        assert_eq!(api.push_text_update(10, "a"), 1);
        assert_eq!(api.push_text_update(10, "b"), 2);
    }

    #[test]
    fn offset_confirms_earlier_updates() {
        let api = MockBotApi::new("1:abc");
        api.push_text_update(10, "a");
        api.push_text_update(10, "b");
        let mut state = api.lock();
        let mut params = Map::new();
        params.insert("offset".to_string(), json!(2));
        let _ = get_updates(&mut state, &params);
        assert_eq!(state.updates.len(), 1);
        assert_eq!(state.updates[0].update_id, 2);
    }

    #[test]
    fn update_serializes_without_empty_message() {
        let update = Update {
            update_id: 3,
            message: None,
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"update_id": 3}));
    }
}
