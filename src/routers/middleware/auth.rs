use std::{str::FromStr, sync::Arc};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
};

/// The authenticated caller, attached to the request by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: i64,
    pub token: Uuid,
}

/// `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn auth_middleware(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
    next: Next,
) -> HandlerResponse<impl IntoResponse> {
    let token = match bearer_token(request.headers()) {
        Some(raw) => Uuid::from_str(raw).map_err(|e| code_err(CodeError::UNAUTHORIZED_ACCESS, e))?,
        None => return Err(CodeError::UNAUTHORIZED_ACCESS.into()),
    };

    let session = state
        .get_session(&token)
        .await
        .map_err(|e| code_err(CodeError::UNAUTHORIZED_ACCESS, e))?;

    if !session.is_unexpired() {
        return Err(code_err(CodeError::UNAUTHORIZED_ACCESS, "Token expired"));
    }

    request.extensions_mut().insert(Principal {
        user_id: session.user_id,
        token,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        let token = Uuid::new_v4().to_string();
        assert_eq!(bearer_token(&with_auth(&format!("Bearer {token}"))), Some(token.as_str()));
        assert_eq!(bearer_token(&with_auth(&format!("bearer  {token}"))), Some(token.as_str()));
    }

    #[test]
    fn test_rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&with_auth("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&with_auth("Bearer")), None);
        assert_eq!(bearer_token(&with_auth("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
