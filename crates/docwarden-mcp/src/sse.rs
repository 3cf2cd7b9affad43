//! HTTP transport for the MCP server
//!
//! Clients POST JSON-RPC messages to `/message` and get the response in the
//! reply body. Every response is also broadcast on the `/sse` event stream,
//! which opens with an `endpoint` event naming the POST route.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use docwarden_storage::CollectionStore;
use futures::stream::Stream;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::McpServer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Responses buffered per slow event-stream subscriber
const EVENT_BUFFER: usize = 100;

/// Browser origins allowed to call the server
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

pub struct SseState<S: CollectionStore + ?Sized> {
    server: Arc<McpServer<S>>,
    events: broadcast::Sender<String>,
    token: Option<String>,
}

impl<S: CollectionStore + ?Sized + 'static> SseState<S> {
    pub fn new(server: Arc<McpServer<S>>, token: Option<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            server,
            events,
            token,
        }
    }

    /// Whether the request carries the configured bearer token
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|given| given == expected)
    }
}

async fn require_token<S: CollectionStore + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" || state.authorized(request.headers()) {
        return next.run(request).await;
    }
    tracing::debug!("Rejected {} without a valid bearer token", request.uri().path());
    (StatusCode::UNAUTHORIZED, "Missing or invalid bearer token").into_response()
}

/// Build the HTTP router; `/health` never requires the token
pub fn create_sse_router<S: CollectionStore + ?Sized + 'static>(
    server: Arc<McpServer<S>>,
    token: Option<String>,
) -> Router {
    let state = Arc::new(SseState::new(server, token));

    let cors = CorsLayer::new()
        .allow_origin(
            LOCAL_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/sse", get(events::<S>))
        .route("/message", post(message::<S>))
        .layer(middleware::from_fn_with_state(state.clone(), require_token::<S>))
        .with_state(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": crate::server::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn events<S: CollectionStore + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe();
    let endpoint = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "endpoint",
        "params": { "endpoint": "/message" },
    });

    Sse::new(async_stream::stream! {
        yield Ok(Event::default().event("endpoint").data(endpoint.to_string()));
        loop {
            match rx.recv().await {
                Ok(payload) => yield Ok(Event::default().event("message").data(payload)),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("Event stream subscriber missed {} responses", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn message<S: CollectionStore + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
    body: String,
) -> Response {
    match state.server.handle_message(&body).await {
        Some(response) => {
            if let Ok(payload) = serde_json::to_string(&response) {
                // send only fails when nobody is subscribed
                let _ = state.events.send(payload);
            }
            Json(response).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Serve the HTTP transport until the listener fails
pub async fn run_sse_server<S: CollectionStore + ?Sized + 'static>(
    server: Arc<McpServer<S>>,
    addr: &str,
    token: Option<String>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "MCP HTTP transport on http://{} (POST /message, GET /sse, GET /health)",
        addr
    );
    axum::serve(listener, create_sse_router(server, token)).await?;
    Ok(())
}
