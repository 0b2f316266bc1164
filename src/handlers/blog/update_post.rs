use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use crate::{
    domain::blog::post::{Post, PostChangeset, resolve_update_timestamps, store_title},
    dto::{
        requests::blog::post_request::PostRequest,
        responses::{
            blog::post_views::PostRecord,
            response_data::{MessageWithData, http_resp},
        },
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::{json::ApiJson, path::ApiPath}, time::now::tokio_now},
};

/// Overwrites the post and replaces its whole category set.
pub async fn update_post(
    State(state): State<Arc<ServerState>>,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(request): ApiJson<PostRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let valid = request.validate()?;
    let (status, created_at, updated_at) =
        resolve_update_timestamps(valid.status, valid.scheduled_at, Utc::now());

    let changes = PostChangeset {
        title: store_title(valid.title),
        short: valid.short.to_owned(),
        content: valid.content.to_owned(),
        thumb: valid.thumb.map(str::to_owned),
        status,
        created_at,
        updated_at,
    };

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let post = Post::update_one(&mut conn, post_id, changes)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?
        .ok_or(CodeError::POST_NOT_FOUND)?;

    let categories = Post::sync_categories(&mut conn, post.id, &request.categories)
        .await
        .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))?;

    drop(conn);

    info!(post_id = post.id, status = post.status, "Post updated");

    Ok(http_resp(
        MessageWithData::new("Post updated successfully", PostRecord::new(post, Some(categories))),
        start,
    ))
}
