use std::sync::Arc;

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use crate::{
    domain::blog::post::{Post, PostInsertable, resolve_timestamps, store_title},
    dto::{
        requests::blog::post_request::PostRequest,
        responses::{
            blog::post_views::PostRecord,
            response_data::{MessageWithData, http_resp_with_status},
        },
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    routers::middleware::auth::Principal,
    util::{extract::json::ApiJson, time::now::tokio_now},
};

pub async fn submit_post(
    Extension(principal): Extension<Principal>,
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<PostRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let valid = request.validate()?;
    let (status, created_at, updated_at) =
        resolve_timestamps(valid.status, valid.scheduled_at, Utc::now());

    let new_post = PostInsertable {
        author_id: Some(principal.user_id),
        title: store_title(valid.title),
        short: valid.short.to_owned(),
        content: valid.content.to_owned(),
        thumb: valid.thumb.map(str::to_owned),
        status: status.as_i16(),
        created_at,
        updated_at,
    };

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let post = Post::insert_one(&mut conn, new_post)
        .await
        .map_err(|e| code_err(CodeError::DB_INSERTION_ERROR, e))?;

    let categories = Post::sync_categories(&mut conn, post.id, &request.categories)
        .await
        .map_err(|e| code_err(CodeError::DB_INSERTION_ERROR, e))?;

    drop(conn);

    info!(post_id = post.id, author_id = principal.user_id, status = post.status, "Post created");

    Ok(http_resp_with_status(
        StatusCode::CREATED,
        MessageWithData::new("Post created successfully", PostRecord::new(post, Some(categories))),
        start,
    ))
}
