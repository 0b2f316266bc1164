use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use diesel::QueryDsl;

use crate::{
    domain::{
        search_filter::{FilterParams, paginate},
        user::User,
    },
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    schema::users,
    util::time::now::tokio_now,
};

pub async fn list_users(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    let params = FilterParams::from_pairs(pairs);

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let page = paginate::<User, _>(
        &mut conn,
        || users::table.into_boxed(),
        &params,
        &[],
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(http_resp(page, start))
}
