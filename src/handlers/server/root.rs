use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use serde_derive::Serialize;

use crate::{
    dto::responses::response_data::http_resp,
    errors::code_error::HandlerResponse,
    init::state::ServerState,
    util::time::{duration_formatter::format_duration, now::tokio_now},
};

pub const API_NAME: &str = "Base RestApi Blog System";

#[derive(Serialize)]
pub struct RootResponse {
    name: &'static str,
    version: &'static str,
    server_uptime: String,
    responses_handled: u64,
}

pub async fn root_handler(
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Ok(http_resp(
        RootResponse {
            name: API_NAME,
            version: env!("CARGO_PKG_VERSION"),
            server_uptime: format_duration(state.get_uptime()),
            responses_handled: state.get_responses_handled(),
        },
        start,
    ))
}
