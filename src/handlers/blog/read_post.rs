use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    domain::{
        blog::post::{ALL_POST_RELATIONS, Post},
        search_filter::Searchable,
    },
    dto::responses::{blog::post_views::PostDetail, response_data::http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

pub async fn read_post(
    State(state): State<Arc<ServerState>>,
    ApiPath(post_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let post = Post::find_published(&mut conn, post_id)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
        .ok_or(CodeError::POST_NOT_FOUND)?;

    let loaded = Post::attach(vec![post], &ALL_POST_RELATIONS, &mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
        .pop()
        .ok_or(CodeError::POST_NOT_FOUND)?;

    drop(conn);

    Ok(http_resp(PostDetail::from(loaded), start))
}
