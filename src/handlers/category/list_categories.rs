use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    domain::{
        blog::category::Category,
        search_filter::{FilterParams, paginate},
    },
    dto::responses::{blog::category_views::CategoryListItem, response_data::http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

pub async fn list_categories(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    let params = FilterParams::from_pairs(pairs);

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let page = paginate::<Category, _>(
        &mut conn,
        Category::listing_base,
        &params,
        &[],
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(http_resp(page.map(CategoryListItem::from), start))
}
