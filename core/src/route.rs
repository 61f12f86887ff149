//! Method/path bindings for the four operations.

use crate::http::HttpMethod;

pub const TODO_PATH: &str = "/api/todo";
pub const TODOS_PATH: &str = "/api/todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Add,
    Get,
    Delete,
    List,
}

impl Route {
    /// The operation bound to `method` on `path`, if any. A single trailing
    /// slash on the path is ignored.
    pub fn resolve(method: HttpMethod, path: &str) -> Option<Route> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        match (method, path) {
            (HttpMethod::Post, TODO_PATH) => Some(Route::Add),
            (HttpMethod::Get, TODO_PATH) => Some(Route::Get),
            (HttpMethod::Delete, TODO_PATH) => Some(Route::Delete),
            (HttpMethod::Get, TODOS_PATH) => Some(Route::List),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Add => "add",
            Route::Get => "get",
            Route::Delete => "delete",
            Route::List => "list",
        }
    }
}
