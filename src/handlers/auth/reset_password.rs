use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    dto::{
        requests::auth::email_request::EmailRequest,
        responses::response_data::{Message, http_resp},
    },
    errors::code_error::HandlerResponse,
    handlers::auth::send_code::issue_code,
    init::state::ServerState,
    util::{extract::json::ApiJson, string::validations::Validator, time::now::tokio_now},
};

pub async fn reset_password(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<EmailRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Validator::new().email("email", request.email.as_deref()).finish()?;
    let email = request.email.as_deref().unwrap_or_default().trim();

    issue_code(&state, email).await?;

    Ok(http_resp(Message::new("Your password reset code has been sent."), start))
}
