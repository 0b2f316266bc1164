use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::blog::category::Category,
    dto::responses::response_data::{Message, http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

/// Trashes a live category; one already in the trash is removed for good.
pub async fn delete_category(
    State(state): State<Arc<ServerState>>,
    ApiPath(category_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let trashed = Category::soft_delete(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?;

    let message = if trashed {
        info!(category_id, "Category moved to trash");
        "Category deleted successfully"
    } else if Category::force_delete(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))?
    {
        info!(category_id, "Trashed category permanently deleted");
        "Category permanently deleted successfully"
    } else {
        return Err(CodeError::CATEGORY_NOT_FOUND.into());
    };

    drop(conn);

    Ok(http_resp(Message::new(message), start))
}
