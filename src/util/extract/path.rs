use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::errors::code_error::{CodeError, CodeErrorResp, code_err};

/// `Path<T>` that answers an unparsable segment (`/posts/abc`) with the JSON 404.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = CodeErrorResp;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection| code_err(CodeError::NOT_FOUND, rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    async fn show(ApiPath(id): ApiPath<i64>) -> String {
        id.to_string()
    }

    async fn call(uri: &str) -> (StatusCode, axum::body::Bytes) {
        let app = Router::new().route("/posts/{post_id}", get(show));
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        (status, axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap())
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_json_404() {
        let (status, body) = call("/posts/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Invalid path!" }));
    }

    #[tokio::test]
    async fn test_numeric_id_is_extracted() {
        let (status, body) = call("/posts/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"42");
    }
}
