use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    domain::user::EmailVerification,
    dto::{
        requests::auth::verify_code_request::VerifyCodeRequest,
        responses::response_data::{Message, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    handlers::auth::verify_code::validate_code_request,
    init::state::ServerState,
    util::{extract::json::ApiJson, time::now::tokio_now},
};

/// Read-only check; the record's status is left alone.
pub async fn verify_reset_code(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<VerifyCodeRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let code = validate_code_request(
        request.email.as_deref(),
        request.code.as_ref(),
        CodeError::INVALID_RESET_CODE,
    )?;
    let email = request.email.as_deref().unwrap_or_default().trim();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let record = EmailVerification::find_by_code(&mut conn, email, code)
        .await?
        .ok_or(CodeError::INVALID_RESET_CODE)?;

    drop(conn);

    if record.is_expired_at(Utc::now()) {
        return Err(CodeError::RESET_CODE_EXPIRED.into());
    }

    Ok(http_resp(Message::new("Reset code is valid."), start))
}
