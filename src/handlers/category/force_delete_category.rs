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

pub async fn force_delete_category(
    State(state): State<Arc<ServerState>>,
    ApiPath(category_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let deleted = Category::force_delete(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))?;

    drop(conn);

    if !deleted {
        return Err(CodeError::CATEGORY_NOT_FOUND.into());
    }

    info!(category_id, "Category permanently deleted");

    Ok(http_resp(
        Message::new("Category permanently deleted successfully"),
        start,
    ))
}
