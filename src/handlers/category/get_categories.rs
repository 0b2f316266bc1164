use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    domain::{
        blog::category::{Category, CategoryBrief},
        search_filter::{FilterParams, paginate},
    },
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

/// Active top-level categories as `{id, name}`.
pub async fn get_categories(
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
        Category::public_base,
        &params,
        &[],
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(http_resp(page.map(CategoryBrief::from), start))
}
