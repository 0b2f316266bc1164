use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::{
    domain::blog::category::Category,
    dto::{
        requests::blog::category_request::CategoryRequest,
        responses::{
            blog::category_views::CategoryRecord,
            response_data::{MessageWithData, http_resp},
        },
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    handlers::category::submit_category::ensure_parent_exists,
    init::state::ServerState,
    util::{extract::{json::ApiJson, path::ApiPath}, time::now::tokio_now},
};

pub async fn update_category(
    State(state): State<Arc<ServerState>>,
    ApiPath(category_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let current = Category::find(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
        .ok_or(CodeError::CATEGORY_NOT_FOUND)?;

    let form = request.into_form(Some(&current))?;

    ensure_parent_exists(&mut conn, form.parent_id).await?;

    let category = Category::update_one(&mut conn, category_id, form)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?
        .ok_or(CodeError::CATEGORY_NOT_FOUND)?;

    drop(conn);

    info!(category_id, "Category updated");

    Ok(http_resp(
        MessageWithData::new("Category updated successfully", CategoryRecord::from(category)),
        start,
    ))
}
