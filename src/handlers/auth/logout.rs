use std::sync::Arc;

use axum::{Extension, extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    dto::responses::response_data::{Message, http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    routers::middleware::auth::Principal,
    util::time::now::tokio_now,
};

/// Revokes only the token this request was made with.
pub async fn logout(
    Extension(principal): Extension<Principal>,
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let (token, remaining) = state
        .remove_session(principal.token)
        .await
        .map_err(|e| code_err(CodeError::UNAUTHORIZED_ACCESS, e))?;

    info!(user_id = principal.user_id, %token, remaining, "Token revoked");

    Ok(http_resp(
        Message::new("You have been logged out successfully."),
        start,
    ))
}
