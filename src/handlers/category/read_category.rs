use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    domain::{
        blog::category::{Category, CategoryChild},
        search_filter::{FetchMode, FilterParams, search},
    },
    dto::responses::{blog::category_views::CategoryDetail, response_data::http_resp},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::path::ApiPath, time::now::tokio_now},
};

/// An active category with its active parent and children.
pub async fn read_category(
    State(state): State<Arc<ServerState>>,
    ApiPath(category_id): ApiPath<i64>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let category = Category::find_active(&mut conn, category_id)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
        .ok_or(CodeError::CATEGORY_NOT_FOUND)?;

    let parent = Category::find_parent(&mut conn, category.parent_id)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    let children: Vec<CategoryChild> = search::<Category, _>(
        &mut conn,
        || Category::children_base(category.id),
        &FilterParams::default(),
        FetchMode::Get,
        &[],
        state.get_pagination_number(),
    )
    .await
    .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
    .into_rows()
    .unwrap_or_default()
    .into_iter()
    .map(|child| CategoryChild {
        id: child.id,
        parent_id: child.parent_id,
        name: child.name,
    })
    .collect();

    drop(conn);

    Ok(http_resp(CategoryDetail::new(category, parent, children), start))
}
