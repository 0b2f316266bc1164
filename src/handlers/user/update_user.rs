use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::user::{User, UserChangeset},
    dto::{
        requests::user::user_form_request::UserFormRequest,
        responses::response_data::{MessageWithData, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{
        crypto::hash_pw::hash_pw,
        extract::{json::ApiJson, path::ApiPath},
        string::validations::Validator,
        time::now::tokio_now,
    },
};

pub async fn update_user(
    State(state): State<Arc<ServerState>>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UserFormRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Validator::new()
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

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let current = User::find(&mut conn, user_id)
        .await?
        .ok_or(CodeError::USER_NOT_FOUND)?;

    let nickname = match request.nickname.as_deref() {
        Some(nickname) => nickname.trim().to_owned(),
        None => current.nickname,
    };

    let hashed_pw = hash_pw(request.password.clone().unwrap_or_default())
        .await
        .map_err(|e| code_err(CodeError::COULD_NOT_HASH_PW, e))?;

    let user = User::update_one(
        &mut conn,
        user_id,
        UserChangeset {
            nickname: Some(nickname),
            first_name: request.first_name.as_deref().map(|s| s.trim().to_owned()),
            last_name: request.last_name.as_deref().map(|s| s.trim().to_owned()),
            password: Some(hashed_pw),
            ..Default::default()
        },
    )
    .await?
    .ok_or(CodeError::USER_NOT_FOUND)?;

    drop(conn);

    info!(user_id = user.id, "User updated");

    Ok(http_resp(
        MessageWithData::new("User updated successfully", user),
        start,
    ))
}
