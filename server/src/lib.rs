//! HTTP host for the todo handler.
//!
//! # Design
//! Axum only does transport here: `HostEvent` turns an incoming request into
//! a core `HttpRequest`, the route function calls the matching
//! `TodoHandler` operation, and the returned `HttpResponse` is written back
//! unchanged. Status mapping, CORS and persistence all live in `todo-core`.
//! Requests axum cannot turn into an event are rejected with a bare status
//! and no body.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tokio::net::TcpListener;
use todo_core::cors;
use todo_core::route::{TODOS_PATH, TODO_PATH};
use todo_core::{HandlerConfig, HttpMethod, HttpRequest, HttpResponse, MemoryStore, TodoHandler};
use tracing::debug;

/// Largest request body read into an event. Larger bodies get a 413.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub type SharedHandler = Arc<TodoHandler<MemoryStore>>;

/// Router over a fresh in-memory store with the default configuration.
pub fn app() -> Router {
    app_with(TodoHandler::new(MemoryStore::new()))
}

pub fn app_with(handler: TodoHandler<MemoryStore>) -> Router {
    Router::new()
        .route(
            TODO_PATH,
            get(get_todo)
                .post(add_todo)
                .delete(delete_todo)
                .fallback(unrouted),
        )
        .route(TODOS_PATH, get(list_todos).fallback(unrouted))
        .fallback(unrouted)
        .with_state(Arc::new(handler))
}

/// Serve on `listener` with configuration taken from the environment.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let handler = TodoHandler::with_config(MemoryStore::new(), HandlerConfig::from_env());
    axum::serve(listener, app_with(handler)).await
}

/// An inbound request as the core sees it.
pub struct HostEvent(pub HttpRequest);

impl<S: Send + Sync> FromRequest<S> for HostEvent {
    type Rejection = Response;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let method: HttpMethod = parts.method.as_str().parse::<HttpMethod>().map_err(|e| {
            debug!(error = %e, "rejecting event");
            into_response(cors::reject(405, e.to_string()))
        })?;
        let body = match Limited::new(body, BODY_LIMIT).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                debug!(limit = BODY_LIMIT, "request body too large");
                let message = format!("request body exceeds {BODY_LIMIT} bytes");
                return Err(into_response(cors::reject(413, message)));
            }
            Err(e) => {
                debug!(error = %e, "failed to read request body");
                let message = format!("failed to read request body: {e}");
                return Err(into_response(cors::reject(400, message)));
            }
        };
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        Ok(HostEvent(HttpRequest {
            method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        }))
    }
}

async fn add_todo(State(handler): State<SharedHandler>, HostEvent(req): HostEvent) -> Response {
    into_response(handler.add(&req))
}

async fn get_todo(State(handler): State<SharedHandler>, HostEvent(req): HostEvent) -> Response {
    into_response(handler.get(&req))
}

async fn delete_todo(State(handler): State<SharedHandler>, HostEvent(req): HostEvent) -> Response {
    into_response(handler.delete(&req))
}

async fn list_todos(State(handler): State<SharedHandler>, HostEvent(req): HostEvent) -> Response {
    into_response(handler.list(&req))
}

async fn unrouted(State(handler): State<SharedHandler>, HostEvent(req): HostEvent) -> Response {
    into_response(handler.handle(&req))
}

fn into_response(resp: HttpResponse) -> Response {
    let mut builder = Response::builder().status(resp.status);
    for (name, value) in &resp.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(resp.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
