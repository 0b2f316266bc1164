use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use diesel_async::AsyncPgConnection;
use tracing::info;

use crate::{
    domain::blog::category::Category,
    dto::{
        requests::blog::category_request::CategoryRequest,
        responses::{
            blog::category_views::CategoryRecord,
            response_data::{MessageWithData, http_resp_with_status},
        },
    },
    errors::code_error::{CodeError, CodeErrorResp, FieldErrors, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::json::ApiJson, time::now::tokio_now},
};

/// 422 unless `parent_id` is absent or names an existing category.
pub async fn ensure_parent_exists(
    conn: &mut AsyncPgConnection,
    parent_id: Option<i64>,
) -> HandlerResponse<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    let exists = Category::exists(conn, parent_id)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;
    if exists {
        return Ok(());
    }

    let mut errors = FieldErrors::new();
    errors.insert(
        "parent_id".to_owned(),
        vec![CodeError::PARENT_CATEGORY_NOT_FOUND.message.to_owned()],
    );
    Err(CodeErrorResp {
        errors: Some(errors),
        ..code_err(CodeError::PARENT_CATEGORY_NOT_FOUND, parent_id)
    })
}

pub async fn submit_category(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let form = request.into_form(None)?;

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    ensure_parent_exists(&mut conn, form.parent_id).await?;

    let category = Category::insert_one(&mut conn, form)
        .await
        .map_err(|e| code_err(CodeError::DB_INSERTION_ERROR, e))?;

    drop(conn);

    info!(category_id = category.id, parent_id = ?category.parent_id, "Category created");

    Ok(http_resp_with_status(
        StatusCode::CREATED,
        MessageWithData::new("Category created successfully", CategoryRecord::from(category)),
        start,
    ))
}
