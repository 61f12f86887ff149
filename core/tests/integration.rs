//! Handler behaviour end-to-end over the in-memory store and a few failing
//! stores.
//!
//! # Design
//! Each test drives `TodoHandler` with plain `HttpRequest` values, the same
//! way a host would, and inspects status, headers and body of the returned
//! `HttpResponse`.

use std::cell::Cell;

use todo_core::{
    Collection, HandlerConfig, HttpMethod, HttpRequest, HttpResponse, KeyValueStore, MemoryStore,
    StatusPolicy, StoreError, Todo, TodoHandler,
};

fn handler() -> TodoHandler<MemoryStore> {
    TodoHandler::new(MemoryStore::new())
}

fn add(h: &TodoHandler<impl KeyValueStore>, todo: &Todo) -> HttpResponse {
    let body = serde_json::to_vec(todo).unwrap();
    h.add(&HttpRequest::new(HttpMethod::Post, "/api/todo").with_body(body))
}

fn get(h: &TodoHandler<impl KeyValueStore>, id: &str) -> HttpResponse {
    h.get(&HttpRequest::new(HttpMethod::Get, &format!("/api/todo?id={id}")))
}

fn delete(h: &TodoHandler<impl KeyValueStore>, id: &str) -> HttpResponse {
    h.delete(&HttpRequest::new(HttpMethod::Delete, &format!("/api/todo?id={id}")))
}

fn list(h: &TodoHandler<impl KeyValueStore>) -> (u16, Vec<Todo>) {
    let resp = h.list(&HttpRequest::new(HttpMethod::Get, "/api/todos"));
    let todos = serde_json::from_slice(&resp.body).unwrap();
    (resp.status, todos)
}

fn assert_cors(resp: &HttpResponse) {
    assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        resp.header("Access-Control-Allow-Methods"),
        Some("GET, POST, PUT, DELETE, OPTIONS")
    );
    assert_eq!(
        resp.header("Access-Control-Allow-Headers"),
        Some("Content-Type, Authorization")
    );
}

// --- collaborator fakes ---

/// A store whose collections can never be opened.
struct DownStore;

impl KeyValueStore for DownStore {
    type Collection = todo_core::memory::MemoryCollection;

    fn open(&self, _name: &str) -> Result<Self::Collection, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// A store whose collections fail selected operations.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_list: bool,
    fail_put: bool,
}

struct FlakyCollection {
    inner: todo_core::memory::MemoryCollection,
    fail_list: bool,
    fail_put: bool,
    gets: Cell<usize>,
}

impl KeyValueStore for FlakyStore {
    type Collection = FlakyCollection;

    fn open(&self, name: &str) -> Result<Self::Collection, StoreError> {
        Ok(FlakyCollection {
            inner: self.inner.open(name)?,
            fail_list: self.fail_list,
            fail_put: self.fail_put,
            gets: Cell::new(0),
        })
    }
}

impl Collection for FlakyCollection {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        self.inner.put(key, value)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        // Every second read fails.
        let n = self.gets.get();
        self.gets.set(n + 1);
        if n % 2 == 1 {
            return Err(StoreError::Backend("read timeout".to_string()));
        }
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        if self.fail_list {
            return Err(StoreError::Backend("scan aborted".to_string()));
        }
        self.inner.list(prefix)
    }
}

// --- round trip / overwrite ---

#[test]
fn add_then_get_round_trips() {
    let h = handler();
    let todo = Todo::new("42", "buy milk", false);
    let resp = add(&h, &todo);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "Todo added successfully");
    assert_cors(&resp);

    let resp = get(&h, "42");
    assert_eq!(resp.status, 200);
    assert_cors(&resp);
    let fetched: Todo = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(fetched, todo);
}

#[test]
fn second_add_overwrites_first() {
    let h = handler();
    add(&h, &Todo::new("1", "a", false));
    add(&h, &Todo::new("1", "b", true));

    let fetched: Todo = serde_json::from_slice(&get(&h, "1").body).unwrap();
    assert_eq!(fetched, Todo::new("1", "b", true));
    assert_eq!(list(&h).1.len(), 1);
}

#[test]
fn ids_with_reserved_characters_round_trip() {
    let h = handler();
    let todo = Todo::new("a b&c", "spaces", true);
    add(&h, &todo);
    let resp = get(&h, "a%20b%26c");
    assert_eq!(resp.status, 200);
    let fetched: Todo = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(fetched, todo);
}

// --- add errors ---

#[test]
fn add_accepts_capitalised_field_names() {
    let h = handler();
    let body = br#"{"ID":"1","Text":"a","Done":true}"#.to_vec();
    let resp = h.add(&HttpRequest::new(HttpMethod::Post, "/api/todo").with_body(body));
    assert_eq!(resp.status, 200);

    let resp = get(&h, "1");
    assert_eq!(resp.status, 200);
    let stored: Todo = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(stored, Todo::new("1", "a", true));
}

#[test]
fn add_malformed_body_is_500_by_default() {
    let h = handler();
    let resp = h.add(&HttpRequest::new(HttpMethod::Post, "/api/todo").with_body("{not json"));
    assert_eq!(resp.status, 500);
    assert!(!resp.body.is_empty());
    assert_cors(&resp);
}

#[test]
fn add_malformed_body_is_400_under_strict_policy() {
    let config = HandlerConfig {
        status_policy: StatusPolicy::Strict,
        ..HandlerConfig::default()
    };
    let h = TodoHandler::with_config(MemoryStore::new(), config);
    let resp = h.add(&HttpRequest::new(HttpMethod::Post, "/api/todo").with_body(""));
    assert_eq!(resp.status, 400);
    assert!(resp.body_text().contains("EOF"));
}

#[test]
fn add_store_failure_is_500() {
    let store = FlakyStore {
        fail_put: true,
        ..FlakyStore::default()
    };
    let h = TodoHandler::new(store);
    let resp = add(&h, &Todo::new("1", "a", false));
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body_text(), "disk full");
    assert_cors(&resp);
}

// --- get / delete errors ---

#[test]
fn get_without_id_is_400() {
    let resp = handler().get(&HttpRequest::new(HttpMethod::Get, "/api/todo"));
    assert_eq!(resp.status, 400);
    assert!(!resp.body.is_empty());
    assert_cors(&resp);
}

#[test]
fn get_missing_key_is_500() {
    let resp = get(&handler(), "nope");
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body_text(), "key not found: /todo/nope");
}

#[test]
fn delete_without_id_is_400() {
    let resp = handler().delete(&HttpRequest::new(HttpMethod::Delete, "/api/todo?other=1"));
    assert_eq!(resp.status, 400);
}

#[test]
fn delete_twice_does_not_fault() {
    let h = handler();
    add(&h, &Todo::new("1", "a", false));
    let first = delete(&h, "1");
    assert_eq!(first.status, 200);
    assert_eq!(first.body_text(), "Todo deleted successfully");

    let second = delete(&h, "1");
    assert_eq!(second.status, 500);
    assert_cors(&second);
}

#[test]
fn unavailable_store_is_500_for_every_operation() {
    let h = TodoHandler::new(DownStore);
    let responses = [
        add(&h, &Todo::new("1", "a", false)),
        get(&h, "1"),
        delete(&h, "1"),
        h.list(&HttpRequest::new(HttpMethod::Get, "/api/todos")),
    ];
    for resp in responses {
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body_text(), "database unavailable: connection refused");
        assert_cors(&resp);
    }
}

// --- list ---

#[test]
fn list_empty_collection_is_empty_array() {
    let h = handler();
    let resp = h.list(&HttpRequest::new(HttpMethod::Get, "/api/todos"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"[]");
    assert_cors(&resp);
}

#[test]
fn list_returns_every_todo_under_prefix() {
    let h = handler();
    add(&h, &Todo::new("b", "second", true));
    add(&h, &Todo::new("a", "first", false));
    h.store()
        .open("/todo/list")
        .unwrap()
        .put("/elsewhere/x", br#"{"id":"x"}"#)
        .unwrap();

    let (status, todos) = list(&h);
    assert_eq!(status, 200);
    assert_eq!(
        todos,
        vec![Todo::new("a", "first", false), Todo::new("b", "second", true)]
    );
}

#[test]
fn list_skips_corrupted_entries() {
    let h = handler();
    add(&h, &Todo::new("1", "good", false));
    add(&h, &Todo::new("3", "also good", true));
    h.store()
        .open("/todo/list")
        .unwrap()
        .put("/todo/2", b"\x00garbage")
        .unwrap();

    let (status, todos) = list(&h);
    assert_eq!(status, 200);
    let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn list_skips_unreadable_entries() {
    let store = FlakyStore::default();
    let h = TodoHandler::new(store);
    for id in ["1", "2", "3", "4"] {
        add(&h, &Todo::new(id, "t", false));
    }
    let (status, todos) = list(&h);
    assert_eq!(status, 200);
    assert_eq!(todos.len(), 2);
}

#[test]
fn list_failure_degrades_to_empty_array() {
    let store = FlakyStore {
        fail_list: true,
        ..FlakyStore::default()
    };
    let h = TodoHandler::new(store);
    add(&h, &Todo::new("1", "hidden", false));
    let resp = h.list(&HttpRequest::new(HttpMethod::Get, "/api/todos"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"[]");
}

// --- configuration ---

#[test]
fn custom_collection_and_prefix_are_used() {
    let config = HandlerConfig {
        collection: "/tasks".to_string(),
        key_prefix: "task:".to_string(),
        ..HandlerConfig::default()
    };
    let h = TodoHandler::with_config(MemoryStore::new(), config);
    add(&h, &Todo::new("7", "x", false));

    let db = h.store().open("/tasks").unwrap();
    assert!(db.get("task:7").is_ok());
    assert_eq!(list(&h).1.len(), 1);
}
