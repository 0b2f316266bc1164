use std::sync::Arc;

use axum::{Extension, extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::user::{User, UserChangeset, default_nickname},
    dto::{
        requests::user::user_form_request::UserFormRequest,
        responses::{response_data::http_resp, user::user_update_response::UserUpdateResponse},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    routers::middleware::auth::Principal,
    util::{
        crypto::hash_pw::hash_pw,
        extract::json::ApiJson,
        string::validations::Validator,
        time::now::tokio_now,
    },
};

/// Partial update of the caller's own profile.
pub async fn update_me(
    Extension(principal): Extension<Principal>,
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<UserFormRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut validator = Validator::new();
    validator
        .sometimes("first_name", request.first_name.as_deref())
        .sometimes("last_name", request.last_name.as_deref())
        .sometimes("nickname", request.nickname.as_deref())
        .sometimes("password", request.password.as_deref())
        .confirmed(
            "password",
            request.password.as_deref(),
            request.password_confirmation.as_deref(),
        );
    if request.email.is_some() {
        validator.email("email", request.email.as_deref());
    }
    validator.finish()?;

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let current = User::find(&mut conn, principal.user_id)
        .await?
        .ok_or_else(|| code_err(CodeError::UNAUTHORIZED_ACCESS, "Token owner no longer exists"))?;

    let first_name = request
        .first_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(current.first_name.as_str())
        .to_owned();
    let last_name = request
        .last_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(current.last_name.as_str())
        .to_owned();
    let nickname = match request.nickname.as_deref() {
        Some(nickname) => nickname.trim().to_owned(),
        None if current.nickname.is_empty() => default_nickname(&first_name, &last_name),
        None => current.nickname.clone(),
    };

    let email = match request.email.as_deref().map(str::trim) {
        Some(email) if email != current.email => {
            if User::email_exists(&mut conn, email).await? {
                return Err(CodeError::EMAIL_MUST_BE_UNIQUE.into());
            }
            Some(email.to_owned())
        }
        _ => None,
    };

    let password = match request.password.clone() {
        Some(password) => Some(
            hash_pw(password)
                .await
                .map_err(|e| code_err(CodeError::COULD_NOT_HASH_PW, e))?,
        ),
        None => None,
    };

    let user = User::update_one(
        &mut conn,
        current.id,
        UserChangeset {
            nickname: Some(nickname),
            first_name: Some(first_name),
            last_name: Some(last_name),
            email,
            password,
            updated_at: None,
        },
    )
    .await?
    .ok_or(CodeError::USER_NOT_FOUND)?;

    drop(conn);

    info!(user_id = user.id, "Profile updated");

    Ok(http_resp(
        UserUpdateResponse {
            message: "Your information has been updated successfully.",
            user,
        },
        start,
    ))
}
