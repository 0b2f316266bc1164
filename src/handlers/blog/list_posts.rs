use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    domain::{
        blog::post::{ALL_POST_RELATIONS, Post},
        search_filter::{FilterParams, paginate},
    },
    dto::responses::{blog::post_views::PostListItem, response_data::http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

/// Every non-trashed post regardless of status.
pub async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    let params = FilterParams::from_pairs(pairs);

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let page = paginate::<Post, _>(
        &mut conn,
        Post::listing_base,
        &params,
        &ALL_POST_RELATIONS,
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(http_resp(page.map(PostListItem::from), start))
}
