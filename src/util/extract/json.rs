use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::errors::code_error::{CodeError, CodeErrorResp, code_err};

/// `Json<T>` whose rejections (bad syntax, wrong content type, missing fields)
/// come back as a 422 in the usual `{message}` shape.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CodeErrorResp;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(code_err(CodeError::VALIDATION_FAILED, rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde_derive::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Ping {
        email: String,
    }

    async fn echo(ApiJson(ping): ApiJson<Ping>) -> String {
        ping.email
    }

    async fn send(body: &'static str) -> (StatusCode, serde_json::Value) {
        let request = axum::http::Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = Router::new().route("/", post(echo)).oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_json_422() {
        let (status, json) = send("{\"email\":").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json, serde_json::json!({ "message": "The given data was invalid." }));

        let (status, json) = send("{}").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], "The given data was invalid.");
    }

    #[tokio::test]
    async fn test_well_formed_body_passes_through() {
        let request = axum::http::Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"a@b.com"}"#))
            .unwrap();
        let resp = Router::new().route("/", post(echo)).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
