//! C-ABI export table for the todo handler.
//!
//! # Overview
//! A WASM runtime or C dispatcher calls one export per event. It passes the
//! event as an `FfiHttpEvent` and its database as an `FfiDatabase` vtable;
//! the export runs the matching `todo-core` operation and writes a response
//! pointer to `out`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Exports return `0` when a response was produced and `1` when the event
//!   could not be read as an HTTP request (null pointers, unknown method,
//!   non-UTF-8 path) or a panic was caught. In the `1` case `*out` is null.
//! - Handler configuration is read from the environment once per process.
//! - The caller owns every returned response and must release it with
//!   `todo_free_response`.

mod host;
pub mod types;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use todo_core::{HandlerConfig, Route, TodoHandler};
use tracing::warn;

use host::HostStore;
use types::*;

pub const TODO_OK: u32 = 0;
pub const TODO_FAILED: u32 = 1;

static CONFIG: OnceLock<HandlerConfig> = OnceLock::new();

fn config() -> HandlerConfig {
    CONFIG.get_or_init(HandlerConfig::from_env).clone()
}

/// Shared body of every export. `route = None` routes by method and path.
fn invoke(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
    route: Option<Route>,
) -> u32 {
    if out.is_null() {
        return TODO_FAILED;
    }
    unsafe { *out = std::ptr::null_mut() };

    catch_unwind(AssertUnwindSafe(|| {
        if event.is_null() || db.is_null() {
            warn!("rejecting event: null argument");
            return TODO_FAILED;
        }
        let Some(req) = (unsafe { (*event).to_core() }) else {
            warn!("rejecting event: not an HTTP request");
            return TODO_FAILED;
        };
        let handler = TodoHandler::with_config(HostStore::new(unsafe { &*db }), config());
        let resp = match route {
            Some(route) => handler.dispatch(route, &req),
            None => handler.handle(&req),
        };
        unsafe { *out = FfiHttpResponse::from_core(resp) };
        TODO_OK
    }))
    .unwrap_or(TODO_FAILED)
}

// ---------------------------------------------------------------------------
// Operation exports
// ---------------------------------------------------------------------------

/// `POST /api/todo`: store the todo in the event body.
#[unsafe(no_mangle)]
pub extern "C" fn todo_add(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
) -> u32 {
    invoke(event, db, out, Some(Route::Add))
}

/// `GET /api/todo?id=`: return the stored todo verbatim.
#[unsafe(no_mangle)]
pub extern "C" fn todo_get(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
) -> u32 {
    invoke(event, db, out, Some(Route::Get))
}

/// `DELETE /api/todo?id=`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_delete(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
) -> u32 {
    invoke(event, db, out, Some(Route::Delete))
}

/// `GET /api/todos`: every stored todo as a JSON array.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
) -> u32 {
    invoke(event, db, out, Some(Route::List))
}

/// Route the event by method and path. Unrouted events get a 404 response.
#[unsafe(no_mangle)]
pub extern "C" fn todo_handle(
    event: *const FfiHttpEvent,
    db: *const FfiDatabase,
    out: *mut *mut FfiHttpResponse,
) -> u32 {
    invoke(event, db, out, None)
}

/// Free a response produced by any export. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_response(resp: *mut FfiHttpResponse) {
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpResponse::free(resp) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
