//! Access-control headers set on every response, so browsers can call the
//! functions directly.

use crate::http::HttpResponse;

pub const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
pub const ALLOW_METHODS: (&str, &str) = (
    "Access-Control-Allow-Methods",
    "GET, POST, PUT, DELETE, OPTIONS",
);
pub const ALLOW_HEADERS: (&str, &str) = (
    "Access-Control-Allow-Headers",
    "Content-Type, Authorization",
);

pub const CORS_HEADERS: [(&str, &str); 3] = [ALLOW_ORIGIN, ALLOW_METHODS, ALLOW_HEADERS];

/// Replace any existing access-control headers on `response` with the fixed set.
pub fn apply(mut response: HttpResponse) -> HttpResponse {
    response
        .headers
        .retain(|(name, _)| !CORS_HEADERS.iter().any(|(cors, _)| name.eq_ignore_ascii_case(cors)));
    let mut headers: Vec<(String, String)> = CORS_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    headers.append(&mut response.headers);
    response.headers = headers;
    response
}

/// A response for a request the host refused before any operation ran.
pub fn reject(status: u16, message: impl Into<Vec<u8>>) -> HttpResponse {
    apply(HttpResponse::new(status, message))
}
