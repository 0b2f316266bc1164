use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use crate::{
    domain::user::{EmailVerification, User, UserChangeset},
    dto::{
        requests::auth::change_password_request::ChangePasswordRequest,
        responses::response_data::{Message, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{
        crypto::hash_pw::hash_pw,
        extract::json::ApiJson,
        string::validations::Validator,
        time::now::tokio_now,
    },
};

pub async fn change_password(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut validator = Validator::new();
    validator
        .email("email", request.email.as_deref())
        .required("password", request.password.as_deref())
        .confirmed(
            "password",
            request.password.as_deref(),
            request.password_confirmation.as_deref(),
        );
    if request.code.as_ref().is_none_or(|c| c.is_blank()) {
        validator.required("code", None);
    }
    validator.finish()?;

    let code = request
        .code
        .as_ref()
        .and_then(|c| c.as_code())
        .ok_or_else(|| code_err(CodeError::INVALID_RESET_CODE, "Code is not numeric"))?;
    let email = request.email.as_deref().unwrap_or_default().trim();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let record = EmailVerification::find_by_code(&mut conn, email, code)
        .await?
        .ok_or(CodeError::INVALID_RESET_CODE)?;

    if record.is_expired_at(Utc::now()) {
        return Err(CodeError::RESET_CODE_EXPIRED.into());
    }

    let user = User::find_by_email(&mut conn, email)
        .await?
        .ok_or(CodeError::USER_NOT_FOUND)?;

    let hashed_pw = hash_pw(request.password.clone().unwrap_or_default())
        .await
        .map_err(|e| code_err(CodeError::COULD_NOT_HASH_PW, e))?;

    User::update_one(
        &mut conn,
        user.id,
        UserChangeset {
            password: Some(hashed_pw),
            ..Default::default()
        },
    )
    .await?
    .ok_or(CodeError::USER_NOT_FOUND)?;

    EmailVerification::delete_for(&mut conn, email).await?;

    drop(conn);

    info!(user_id = user.id, "Password changed");

    Ok(http_resp(
        Message::new("Your password has been changed successfully."),
        start,
    ))
}
