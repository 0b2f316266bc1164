use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::blog::post::Post,
    dto::responses::{
        blog::post_views::PostRecord,
        response_data::{MessageWithData, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

pub async fn restore_post(
    State(state): State<Arc<ServerState>>,
    ApiPath(post_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let post = Post::restore(&mut conn, post_id)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?
        .ok_or(CodeError::POST_NOT_FOUND)?;

    drop(conn);

    info!(post_id, "Post restored");

    Ok(http_resp(
        MessageWithData::new("Post restored successfully", PostRecord::new(post, None)),
        start,
    ))
}
