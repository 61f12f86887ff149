//! Replay the request scenarios stored in `test-vectors/` against a fresh
//! handler per case.
//!
//! Each case is a sequence of requests with the expected status and,
//! optionally, the exact body text or the body as parsed JSON. Comparing
//! parsed JSON (not raw strings) avoids false negatives from formatting.

use todo_core::{
    HandlerConfig, HttpMethod, HttpRequest, HttpResponse, MemoryStore, StatusPolicy, TodoHandler,
};

/// Build an `HttpRequest` from a vector's `request` object.
fn request_from(value: &serde_json::Value) -> HttpRequest {
    let method: HttpMethod = value["method"].as_str().unwrap().parse().unwrap();
    let req = HttpRequest::new(method, value["path"].as_str().unwrap());
    match value["body"].as_str() {
        Some(body) => req.with_body(body),
        None => req,
    }
}

fn check(name: &str, index: usize, resp: &HttpResponse, expected: &serde_json::Value) {
    let status = expected["status"].as_u64().unwrap() as u16;
    assert_eq!(resp.status, status, "{name} step {index}: status");

    assert_eq!(
        resp.header("Access-Control-Allow-Origin"),
        Some("*"),
        "{name} step {index}: cors"
    );

    if let Some(body) = expected["body"].as_str() {
        assert_eq!(resp.body_text(), body, "{name} step {index}: body");
    }
    if !expected["json"].is_null() {
        let parsed: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(parsed, expected["json"], "{name} step {index}: json body");
    }
    if expected["body_nonempty"].as_bool() == Some(true) {
        assert!(!resp.body.is_empty(), "{name} step {index}: empty body");
    }
}

#[test]
fn scenario_test_vectors() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let raw = include_str!("../../test-vectors/scenarios.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status_policy: StatusPolicy = case["status_policy"]
            .as_str()
            .map(|p| p.parse().unwrap())
            .unwrap_or_default();
        let config = HandlerConfig {
            status_policy,
            ..HandlerConfig::default()
        };
        let handler = TodoHandler::with_config(MemoryStore::new(), config);

        for (index, step) in case["steps"].as_array().unwrap().iter().enumerate() {
            let resp = handler.handle(&request_from(&step["request"]));
            check(name, index, &resp, &step["expected"]);
        }
    }
}
