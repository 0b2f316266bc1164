use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::{
    domain::user::{DEFAULT_USER_TYPE, User, UserInsertable, default_nickname},
    dto::{
        requests::user::user_form_request::UserFormRequest,
        responses::response_data::{MessageWithData, http_resp_with_status},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{crypto::hash_pw::hash_pw, extract::json::ApiJson, time::now::tokio_now},
};

pub async fn create_user(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<UserFormRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    request.validate_create()?;

    let email = request.email.as_deref().unwrap_or_default().trim();
    let first_name = request.first_name.as_deref().unwrap_or_default().trim();
    let last_name = request.last_name.as_deref().unwrap_or_default().trim();
    let nickname = match request.nickname.as_deref() {
        Some(nickname) => nickname.trim().to_owned(),
        None => default_nickname(first_name, last_name),
    };
    let user_type = request
        .user_type
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_USER_TYPE);

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    if User::email_exists(&mut conn, email).await? {
        return Err(CodeError::EMAIL_MUST_BE_UNIQUE.into());
    }

    let hashed_pw = hash_pw(request.password.clone().unwrap_or_default())
        .await
        .map_err(|e| code_err(CodeError::COULD_NOT_HASH_PW, e))?;

    let user = User::insert_one(
        &mut conn,
        UserInsertable::new(&nickname, first_name, last_name, email, &hashed_pw, user_type),
    )
    .await?;

    drop(conn);

    info!(user_id = user.id, "User created");

    Ok(http_resp_with_status(
        StatusCode::CREATED,
        MessageWithData::new("User created successfully", user),
        start,
    ))
}
