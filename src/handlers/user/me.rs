use std::sync::Arc;

use axum::{Extension, extract::State, response::IntoResponse};

use crate::{
    domain::user::User,
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    routers::middleware::auth::Principal,
    util::time::now::tokio_now,
};

pub async fn me(
    Extension(principal): Extension<Principal>,
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    // a token can outlive its user
    let user = User::find(&mut conn, principal.user_id)
        .await?
        .ok_or_else(|| code_err(CodeError::UNAUTHORIZED_ACCESS, "Token owner no longer exists"))?;

    drop(conn);

    Ok(http_resp(user, start))
}
