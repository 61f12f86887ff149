//! The four todo operations over a host-supplied key-value store.
//!
//! # Design
//! `TodoHandler` owns a `KeyValueStore` and a `HandlerConfig` and nothing
//! else; it keeps no state between requests. Every operation opens the
//! configured collection, does one kind of store access, and returns an
//! `HttpResponse` carrying the CORS headers whether it succeeded or not.
//! Each public operation is a thin wrapper around a `try_*` method returning
//! `Result<_, HandlerError>`, so the error-to-status mapping lives in one
//! place (`respond`).

use tracing::{debug, instrument, warn};

use crate::config::HandlerConfig;
use crate::cors;
use crate::error::HandlerError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::Route;
use crate::store::{Collection, KeyValueStore};
use crate::types::Todo;

pub const ADDED_MESSAGE: &str = "Todo added successfully";
pub const DELETED_MESSAGE: &str = "Todo deleted successfully";
pub const NOT_FOUND_MESSAGE: &str = "no route for request";

const EMPTY_ARRAY: &[u8] = b"[]";

#[derive(Debug, Clone)]
pub struct TodoHandler<S> {
    store: S,
    config: HandlerConfig,
}

impl<S: KeyValueStore> TodoHandler<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, HandlerConfig::default())
    }

    pub fn with_config(store: S, config: HandlerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Route `req` by method and path, then run the matching operation.
    /// Unrouted requests get a 404 with the CORS headers.
    pub fn handle(&self, req: &HttpRequest) -> HttpResponse {
        match Route::resolve(req.method, &req.path) {
            Some(route) => self.dispatch(route, req),
            None => {
                debug!(method = %req.method, path = %req.path, "unrouted request");
                cors::apply(HttpResponse::new(404, NOT_FOUND_MESSAGE))
            }
        }
    }

    pub fn dispatch(&self, route: Route, req: &HttpRequest) -> HttpResponse {
        match route {
            Route::Add => self.add(req),
            Route::Get => self.get(req),
            Route::Delete => self.delete(req),
            Route::List => self.list(req),
        }
    }

    /// Decode the body as a `Todo` and store it under its id, replacing any
    /// previous record.
    #[instrument(level = "debug", skip_all, fields(route = "add"))]
    pub fn add(&self, req: &HttpRequest) -> HttpResponse {
        self.respond(Route::Add, self.try_add(req))
    }

    /// Return the stored bytes for `?id=` verbatim.
    #[instrument(level = "debug", skip_all, fields(route = "get"))]
    pub fn get(&self, req: &HttpRequest) -> HttpResponse {
        self.respond(Route::Get, self.try_get(req))
    }

    #[instrument(level = "debug", skip_all, fields(route = "delete"))]
    pub fn delete(&self, req: &HttpRequest) -> HttpResponse {
        self.respond(Route::Delete, self.try_delete(req))
    }

    /// Every decodable todo under the key prefix, as a JSON array. Listing
    /// or per-entry failures shrink the array instead of failing the request.
    #[instrument(level = "debug", skip_all, fields(route = "list"))]
    pub fn list(&self, _req: &HttpRequest) -> HttpResponse {
        self.respond(Route::List, self.try_list())
    }

    fn try_add(&self, req: &HttpRequest) -> Result<HttpResponse, HandlerError> {
        let db = self.open()?;
        let todo = Todo::decode_first(&req.body)
            .map_err(|e| HandlerError::MalformedBody(e.to_string()))?;
        let value = serde_json::to_vec(&todo)?;
        let key = self.config.key_for(&todo.id);
        db.put(&key, &value).map_err(HandlerError::Store)?;
        debug!(%key, "stored todo");
        Ok(HttpResponse::new(200, ADDED_MESSAGE))
    }

    fn try_get(&self, req: &HttpRequest) -> Result<HttpResponse, HandlerError> {
        let id = required_id(req)?;
        let db = self.open()?;
        let value = db
            .get(&self.config.key_for(&id))
            .map_err(HandlerError::Store)?;
        Ok(HttpResponse::new(200, value))
    }

    fn try_delete(&self, req: &HttpRequest) -> Result<HttpResponse, HandlerError> {
        let id = required_id(req)?;
        let db = self.open()?;
        let key = self.config.key_for(&id);
        db.delete(&key).map_err(HandlerError::Store)?;
        debug!(%key, "deleted todo");
        Ok(HttpResponse::new(200, DELETED_MESSAGE))
    }

    fn try_list(&self) -> Result<HttpResponse, HandlerError> {
        let db = self.open()?;
        let todos = self.collect_todos(&db);
        let body = serde_json::to_vec(&todos).unwrap_or_else(|_| EMPTY_ARRAY.to_vec());
        let mut response = HttpResponse::new(200, body);
        response
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        Ok(response)
    }

    fn collect_todos(&self, db: &S::Collection) -> Vec<Todo> {
        let keys = match db.list(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "listing keys failed, returning empty list");
                return Vec::new();
            }
        };
        keys.iter()
            .filter_map(|key| {
                let value = db
                    .get(key)
                    .map_err(|e| debug!(%key, error = %e, "skipping unreadable entry"))
                    .ok()?;
                serde_json::from_slice::<Todo>(&value)
                    .map_err(|e| warn!(%key, error = %e, "skipping undecodable entry"))
                    .ok()
            })
            .collect()
    }

    fn open(&self) -> Result<S::Collection, HandlerError> {
        self.store.open(&self.config.collection).map_err(|e| {
            warn!(collection = %self.config.collection, error = %e, "failed to open collection");
            HandlerError::Open(e)
        })
    }

    fn respond(&self, route: Route, result: Result<HttpResponse, HandlerError>) -> HttpResponse {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                let status = err.status(self.config.status_policy);
                warn!(route = route.name(), status, error = %err, "request failed");
                HttpResponse::new(status, err.to_string())
            }
        };
        cors::apply(response)
    }
}

fn required_id(req: &HttpRequest) -> Result<String, HandlerError> {
    req.query_param("id")
        .filter(|id| !id.is_empty())
        .ok_or(HandlerError::MissingParameter("id"))
}
