use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    domain::user::User,
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

pub async fn get_user(
    State(state): State<Arc<ServerState>>,
    ApiPath(user_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let user = User::find(&mut conn, user_id)
        .await?
        .ok_or(CodeError::USER_NOT_FOUND)?;

    drop(conn);

    Ok(http_resp(user, start))
}
