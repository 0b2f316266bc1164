use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use crate::{
    domain::user::{DEFAULT_USER_TYPE, EmailVerification, User, UserInsertable, default_nickname},
    dto::{
        requests::auth::register_request::RegisterRequest,
        responses::{auth::token_response::TokenResponse, response_data::http_resp_with_status},
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

pub async fn register(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Validator::new()
        .email("email", request.email.as_deref())
        .required("first_name", request.first_name.as_deref())
        .required("last_name", request.last_name.as_deref())
        .sometimes("nickname", request.nickname.as_deref())
        .required("password", request.password.as_deref())
        .confirmed(
            "password",
            request.password.as_deref(),
            request.password_confirmation.as_deref(),
        )
        .finish()?;

    let email = request.email.as_deref().unwrap_or_default().trim();
    let first_name = request.first_name.as_deref().unwrap_or_default().trim();
    let last_name = request.last_name.as_deref().unwrap_or_default().trim();
    let nickname = match request.nickname.as_deref() {
        Some(nickname) => nickname.trim().to_owned(),
        None => default_nickname(first_name, last_name),
    };

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    if User::email_exists(&mut conn, email).await? {
        return Err(CodeError::EMAIL_MUST_BE_UNIQUE.into());
    }

    let verification = EmailVerification::find_confirmed(&mut conn, email)
        .await?
        .ok_or(CodeError::EMAIL_NOT_VERIFIED)?;

    if verification.is_expired_at(Utc::now()) {
        return Err(CodeError::VERIFICATION_CODE_EXPIRED.into());
    }

    let hashed_pw = hash_pw(request.password.clone().unwrap_or_default())
        .await
        .map_err(|e| code_err(CodeError::COULD_NOT_HASH_PW, e))?;

    let user = User::insert_one(
        &mut conn,
        UserInsertable::new(&nickname, first_name, last_name, email, &hashed_pw, DEFAULT_USER_TYPE),
    )
    .await?;

    EmailVerification::delete_for(&mut conn, email).await?;

    drop(conn);

    let token = state
        .new_session(user.id)
        .await
        .map_err(|e| code_err(CodeError::SESSION_ID_ALREADY_EXISTS, e))?;

    info!(user_id = user.id, "User registered");

    Ok(http_resp_with_status(
        StatusCode::CREATED,
        TokenResponse {
            message: "Registration successful.",
            token,
            user,
        },
        start,
    ))
}
