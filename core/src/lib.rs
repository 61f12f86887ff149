//! Todo CRUD handler core.
//!
//! # Overview
//! Four operations (add, get, delete, list) over one todo collection in a
//! host-provided key-value store. Each operation takes an `HttpRequest` and
//! returns an `HttpResponse` without touching the network (host-does-IO
//! pattern). The host decides how requests arrive: the `todo-server` crate
//! maps an axum router onto `TodoHandler::handle`, and `todo-ffi` exposes the
//! operations as C-ABI exports.
//!
//! # Design
//! - `TodoHandler` is stateless apart from its store handle and config.
//! - The store is reached only through the `KeyValueStore` / `Collection`
//!   traits; `MemoryStore` is the in-process implementation.
//! - Every response carries the same three access-control headers.
//! - Listing is best effort: it always answers 200 with a JSON array.

pub mod config;
pub mod cors;
pub mod error;
pub mod handler;
pub mod http;
pub mod memory;
pub mod route;
pub mod store;
pub mod types;

pub use config::{HandlerConfig, StatusPolicy};
pub use error::HandlerError;
pub use handler::TodoHandler;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use memory::MemoryStore;
pub use route::Route;
pub use store::{Collection, KeyValueStore, StoreError};
pub use types::Todo;
