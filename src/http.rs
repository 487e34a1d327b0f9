use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, TimeQueryError};
use crate::mcp::{process_request, RpcRequest};
use crate::service::{AbsoluteParams, QueryParams, TimeService};

type Sessions = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<Event>>>>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TimeService>,
    pub sessions: Sessions,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

fn bad_body(e: JsonRejection) -> axum::response::Response {
    ErrorResponse {
        error: format!("invalid request body: {e}"),
    }
    .into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryParams>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(p)) => (StatusCode::OK, Json(state.service.analyze(&p.query))).into_response(),
        Err(e) => bad_body(e),
    }
}

async fn resolve_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryParams>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(p)) => (StatusCode::OK, Json(state.service.resolve(&p.query))).into_response(),
        Err(e) => bad_body(e),
    }
}

async fn absolute_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AbsoluteParams>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(p)) => (StatusCode::OK, Json(state.service.absolute(&p.start, &p.end))).into_response(),
        Err(e) => bad_body(e),
    }
}

async fn prompt_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryParams>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(p)) => (StatusCode::OK, Json(state.service.prompt(&p.query))).into_response(),
        Err(e) => bad_body(e),
    }
}

async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let session_id = format!("{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));

    // MCP 客户端先收到 endpoint 事件，再往该地址 POST 消息
    let endpoint_url = format!("/message?session_id={session_id}");
    let _ = tx.send(Event::default().event("endpoint").data(endpoint_url));

    match state.sessions.write() {
        Ok(mut sessions) => {
            sessions.insert(session_id.clone(), tx.clone());
        }
        Err(e) => warn!(error = %e, "session table poisoned"),
    }

    // SSE 流被丢弃（客户端断开）时接收端关闭，随即清理会话
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        tx.closed().await;
        if let Ok(mut sessions) = sessions.write() {
            sessions.remove(&session_id);
        }
        debug!(session_id = %session_id, "sse session closed");
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, axum::Error>);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Deserialize)]
struct MessageQuery {
    session_id: String,
}

async fn message_handler(
    State(state): State<AppState>,
    Query(q): Query<MessageQuery>,
    Json(req): Json<RpcRequest>,
) -> impl IntoResponse {
    let sender = state
        .sessions
        .read()
        .ok()
        .and_then(|sessions| sessions.get(&q.session_id).cloned());

    let Some(sender) = sender else {
        return StatusCode::NOT_FOUND;
    };

    if let Some(resp) = process_request(&state.service, req) {
        if let Ok(json_str) = serde_json::to_string(&resp) {
            if sender.send(Event::default().event("message").data(json_str)).is_err() {
                // 客户端已断开
                if let Ok(mut sessions) = state.sessions.write() {
                    sessions.remove(&q.session_id);
                }
            }
        }
    }
    StatusCode::ACCEPTED
}

pub fn build_router(service: Arc<TimeService>) -> Router {
    router_with_state(AppState {
        service,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    })
}

pub fn router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/time/analyze", post(analyze_handler))
        .route("/time/resolve", post(resolve_handler))
        .route("/time/absolute", post(absolute_handler))
        .route("/time/prompt", post(prompt_handler))
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .with_state(state)
}

pub async fn serve_http(config: &Config, service: Arc<TimeService>) -> Result<()> {
    let router = build_router(service);
    let addr = config.http_bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| TimeQueryError::ConfigError(format!("bind {addr} failed: {e}")))?;
    info!("HTTP server listening on http://{}", addr);
    axum::serve(listener, router).await.map_err(|e| e.into())
}
