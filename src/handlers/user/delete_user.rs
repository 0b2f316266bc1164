use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    response::IntoResponse,
};
use tracing::info;

use crate::{
    domain::user::User,
    dto::responses::response_data::{Message, http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    routers::middleware::auth::Principal,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

pub async fn delete_user(
    Extension(principal): Extension<Principal>,
    State(state): State<Arc<ServerState>>,
    ApiPath(user_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    if principal.user_id == user_id {
        return Err(CodeError::CANNOT_DELETE_SELF.into());
    }

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    if !User::delete_one(&mut conn, user_id).await? {
        return Err(CodeError::USER_NOT_FOUND.into());
    }

    drop(conn);

    let revoked = state.revoke_user_sessions(user_id).await;
    info!(user_id, revoked, deleted_by = principal.user_id, "User deleted");

    Ok(http_resp(Message::new("User deleted successfully"), start))
}
