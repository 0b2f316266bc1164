use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use lettre::AsyncTransport;
use tracing::info;

use crate::{
    domain::user::{EmailVerification, generate_code},
    dto::{
        requests::auth::email_request::EmailRequest,
        responses::response_data::{Message, http_resp},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::{
        email::emails::VerificationCodeEmail,
        extract::json::ApiJson,
        string::validations::Validator,
        time::now::tokio_now,
    },
};

/// Upserts a fresh code for `email` and mails it. Shared by sign-up and password reset.
pub async fn issue_code(state: &ServerState, email: &str) -> HandlerResponse<()> {
    let code = generate_code();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    EmailVerification::upsert(&mut conn, email, code, Utc::now()).await?;

    drop(conn);

    let message = VerificationCodeEmail::new()
        .set_code(code)
        .to_message(state.get_mail_from(), email)
        .map_err(|e| code_err(CodeError::EMAIL_SEND_ERROR, e))?;

    state
        .get_email_client()
        .send(message)
        .await
        .map_err(|e| code_err(CodeError::EMAIL_SEND_ERROR, e))?;

    info!(email, "Verification code sent");
    Ok(())
}

pub async fn send_code(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<EmailRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Validator::new().email("email", request.email.as_deref()).finish()?;
    let email = request.email.as_deref().unwrap_or_default().trim();

    issue_code(&state, email).await?;

    Ok(http_resp(Message::new("Your verification code has been sent."), start))
}
