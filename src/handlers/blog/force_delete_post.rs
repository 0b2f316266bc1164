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

pub async fn force_delete_post(
    State(state): State<Arc<ServerState>>,
    ApiPath(post_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let deleted = Post::force_delete(&mut conn, post_id)
        .await
        .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))?;

    drop(conn);

    if !deleted {
        return Err(CodeError::POST_NOT_FOUND.into());
    }

    info!(post_id, "Post permanently deleted");

    Ok(http_resp(Message::new("Post permanently deleted successfully"), start))
}
