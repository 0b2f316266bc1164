use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::blog::category::Category,
    dto::responses::{
        blog::category_views::CategoryRecord,
        response_data::{MessageWithData, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

pub async fn restore_category(
    State(state): State<Arc<ServerState>>,
    ApiPath(category_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let category = Category::restore(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?
        .ok_or(CodeError::CATEGORY_NOT_FOUND)?;

    drop(conn);

    info!(category_id, "Category restored");

    Ok(http_resp(
        MessageWithData::new("Category restored successfully", CategoryRecord::from(category)),
        start,
    ))
}
