use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use diesel_async::RunQueryDsl;
use serde_derive::Serialize;

use crate::{
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

#[derive(Serialize)]
pub struct HealthcheckResponse {
    status: &'static str,
    db_ping_us: u128,
}

/// Round-trips `SELECT 1` through the pool.
pub async fn healthcheck(
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let ping_start = tokio_now();
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;
    let db_ping_us = ping_start.elapsed().as_micros();

    drop(conn);

    Ok(http_resp(
        HealthcheckResponse {
            status: "ok",
            db_ping_us,
        },
        start,
    ))
}
