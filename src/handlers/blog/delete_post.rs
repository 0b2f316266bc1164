use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::blog::post::Post,
    dto::responses::response_data::{Message, http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

/// Trashes a live post; a post already in the trash is removed for good.
pub async fn delete_post(
    State(state): State<Arc<ServerState>>,
    ApiPath(post_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let trashed = Post::soft_delete(&mut conn, post_id)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?;

    let message = if trashed {
        info!(post_id, "Post moved to trash");
        "Post deleted successfully"
    } else if Post::force_delete(&mut conn, post_id)
        .await
        .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))?
    {
        info!(post_id, "Trashed post permanently deleted");
        "Post permanently deleted successfully"
    } else {
        return Err(CodeError::POST_NOT_FOUND.into());
    };

    drop(conn);

    Ok(http_resp(Message::new(message), start))
}
