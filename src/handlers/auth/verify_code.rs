use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    domain::user::EmailVerification,
    dto::{
        requests::auth::verify_code_request::{CodeInput, VerifyCodeRequest},
        responses::response_data::{Message, http_resp},
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    util::{extract::json::ApiJson, string::validations::Validator, time::now::tokio_now},
};

/// Checks `email` + `code` shape; an unparsable code is reported as `invalid`.
pub fn validate_code_request(
    email: Option<&str>,
    code: Option<&CodeInput>,
    invalid: CodeError,
) -> Result<i32, CodeErrorResp> {
    let mut validator = Validator::new();
    validator.email("email", email);
    if code.is_none_or(CodeInput::is_blank) {
        validator.required("code", None);
    }
    validator.finish()?;

    code.and_then(CodeInput::as_code)
        .ok_or_else(|| code_err(invalid, "Code is not numeric"))
}

pub async fn verify_code(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<VerifyCodeRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let code = validate_code_request(
        request.email.as_deref(),
        request.code.as_ref(),
        CodeError::INVALID_VERIFICATION_CODE,
    )?;
    let email = request.email.as_deref().unwrap_or_default().trim();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let record = EmailVerification::find_by_code(&mut conn, email, code)
        .await?
        .ok_or(CodeError::INVALID_VERIFICATION_CODE)?;

    if record.is_expired_at(Utc::now()) {
        return Err(CodeError::VERIFICATION_CODE_EXPIRED.into());
    }

    EmailVerification::confirm(&mut conn, email).await?;

    drop(conn);

    Ok(http_resp(Message::new("Verification code is valid."), start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_code_is_a_validation_failure() {
        let err = validate_code_request(Some("a@b.com"), None, CodeError::INVALID_VERIFICATION_CODE)
            .unwrap_err();
        assert_eq!(err.http_status_code.as_u16(), 422);
        assert!(err.errors.unwrap().contains_key("code"));
    }

    #[test]
    fn test_non_numeric_code_is_invalid() {
        let code = CodeInput::Text("abc".into());
        let err = validate_code_request(Some("a@b.com"), Some(&code), CodeError::INVALID_RESET_CODE)
            .unwrap_err();
        assert_eq!(err.message, "Invalid reset code.");
        assert!(err.errors.is_none());
    }

    #[test]
    fn test_numeric_code_passes() {
        let code = CodeInput::Number(123456);
        assert_eq!(
            validate_code_request(Some("a@b.com"), Some(&code), CodeError::INVALID_VERIFICATION_CODE)
                .unwrap(),
            123456
        );
    }
}
