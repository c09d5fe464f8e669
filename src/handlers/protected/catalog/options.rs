use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const COLLECTION_METHODS: &str = "GET,HEAD,POST,OPTIONS";
const RECORD_METHODS: &str = "GET,HEAD,PUT,PATCH,DELETE,OPTIONS";

fn allow(methods: &'static str) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::ALLOW, HeaderValue::from_static(methods));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(methods));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

/// OPTIONS /{resource}
pub async fn collection_options() -> Response {
    allow(COLLECTION_METHODS)
}

/// OPTIONS /{resource}/:id
pub async fn record_options() -> Response {
    allow(RECORD_METHODS)
}
