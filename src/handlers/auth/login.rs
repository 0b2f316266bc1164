use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::user::User,
    dto::{
        requests::auth::login_request::LoginRequest,
        responses::{auth::token_response::TokenResponse, response_data::http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{
        crypto::verify_pw::verify_pw,
        extract::json::ApiJson,
        string::validations::Validator,
        time::now::tokio_now,
    },
};

pub async fn login(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Validator::new()
        .email("email", request.email.as_deref())
        .required("password", request.password.as_deref())
        .finish()?;

    let email = request.email.as_deref().unwrap_or_default().trim();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let user = User::find_by_email(&mut conn, email)
        .await?
        .ok_or(CodeError::INVALID_CREDENTIALS)?;

    drop(conn);

    match verify_pw(request.password.as_deref().unwrap_or_default(), &user.password).await {
        Ok(true) => (),
        Ok(false) => return Err(code_err(CodeError::INVALID_CREDENTIALS, "Wrong password")),
        Err(e) => return Err(code_err(CodeError::COULD_NOT_VERIFY_PW, e)),
    }

    let token = state
        .new_session(user.id)
        .await
        .map_err(|e| code_err(CodeError::SESSION_ID_ALREADY_EXISTS, e))?;

    info!(user_id = user.id, "User logged in");

    Ok(http_resp(
        TokenResponse {
            message: "Login successful.",
            token,
            user,
        },
        start,
    ))
}
