use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
};
use serde_derive::Serialize;

pub const X_RESPONSE_TIME: &str = "x-response-time";

/// A JSON body with a status code, stamped with the handler's processing time.
pub struct Response<D: serde::Serialize> {
    status: StatusCode,
    data: D,
    start: tokio::time::Instant,
}

impl<D: serde::Serialize> IntoResponse for Response<D> {
    fn into_response(self) -> axum::response::Response {
        let elapsed_us = self.start.elapsed().as_micros();
        let mut resp = (self.status, Json(self.data)).into_response();
        if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_us}us")) {
            resp.headers_mut().insert(X_RESPONSE_TIME, value);
        }
        resp
    }
}

pub fn http_resp<D: serde::Serialize>(data: D, start: tokio::time::Instant) -> Response<D> {
    http_resp_with_status(StatusCode::OK, data, start)
}

pub fn http_resp_with_status<D: serde::Serialize>(
    status: StatusCode,
    data: D,
    start: tokio::time::Instant,
) -> Response<D> {
    Response {
        status,
        data,
        start,
    }
}

#[derive(Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Self {
        Message { message }
    }
}

/// `{message, data}`, returned by every create/update/restore.
#[derive(Serialize)]
pub struct MessageWithData<D: serde::Serialize> {
    pub message: &'static str,
    pub data: D,
}

impl<D: serde::Serialize> MessageWithData<D> {
    pub fn new(message: &'static str, data: D) -> Self {
        MessageWithData { message, data }
    }
}
