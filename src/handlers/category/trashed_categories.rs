use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    domain::{
        blog::category::{Category, CategoryBrief},
        search_filter::{FilterParams, Page, paginate},
    },
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

async fn trash_page(
    state: &ServerState,
    parent_id: Option<i64>,
    pairs: Vec<(String, String)>,
) -> HandlerResponse<Page<CategoryBrief>> {
    let params = FilterParams::from_pairs(pairs);

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let page = paginate::<Category, _>(
        &mut conn,
        || Category::trash_base(parent_id),
        &params,
        &[],
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(page.map(CategoryBrief::from))
}

/// Trashed top-level categories.
pub async fn trashed_categories(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    let page = trash_page(&state, None, pairs).await?;
    Ok(http_resp(page, start))
}

/// Trashed children of `parent_id`.
pub async fn trashed_child_categories(
    State(state): State<Arc<ServerState>>,
    ApiPath(parent_id): ApiPath<i64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    let page = trash_page(&state, Some(parent_id), pairs).await?;
    Ok(http_resp(page, start))
}
