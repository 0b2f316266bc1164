use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use tracing::Level;

pub type HandlerResponse<T> = Result<T, CodeErrorResp>;

/// Field name -> human readable validation failures, as returned in `errors`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy)]
pub struct CodeError {
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
    pub log_level: Level,
}

impl CodeError {
    // 5xx
    pub const POOL_ERROR: CodeError = CodeError {
        error_code: 0,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not get a database connection!",
        log_level: Level::ERROR,
    };
    pub const DB_QUERY_ERROR: CodeError = CodeError {
        error_code: 1,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Database query failed!",
        log_level: Level::ERROR,
    };
    pub const DB_INSERTION_ERROR: CodeError = CodeError {
        error_code: 2,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not save the record!",
        log_level: Level::ERROR,
    };
    pub const DB_UPDATE_ERROR: CodeError = CodeError {
        error_code: 3,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not update the record!",
        log_level: Level::ERROR,
    };
    pub const DB_DELETION_ERROR: CodeError = CodeError {
        error_code: 4,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not delete the record!",
        log_level: Level::ERROR,
    };
    pub const COULD_NOT_HASH_PW: CodeError = CodeError {
        error_code: 5,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not hash password!",
        log_level: Level::ERROR,
    };
    pub const COULD_NOT_VERIFY_PW: CodeError = CodeError {
        error_code: 6,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not verify password!",
        log_level: Level::ERROR,
    };
    pub const EMAIL_SEND_ERROR: CodeError = CodeError {
        error_code: 7,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not send email!",
        log_level: Level::ERROR,
    };
    pub const SESSION_ID_ALREADY_EXISTS: CodeError = CodeError {
        error_code: 8,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not issue a token!",
        log_level: Level::ERROR,
    };

    // 401 / 403
    pub const UNAUTHORIZED_ACCESS: CodeError = CodeError {
        error_code: 20,
        http_status_code: StatusCode::UNAUTHORIZED,
        message: "Unauthenticated.",
        log_level: Level::INFO,
    };
    pub const INVALID_CREDENTIALS: CodeError = CodeError {
        error_code: 21,
        http_status_code: StatusCode::UNAUTHORIZED,
        message: "Invalid login credentials.",
        log_level: Level::INFO,
    };
    pub const CANNOT_DELETE_SELF: CodeError = CodeError {
        error_code: 22,
        http_status_code: StatusCode::FORBIDDEN,
        message: "You can't delete your own account",
        log_level: Level::WARN,
    };

    // 404
    pub const NOT_FOUND: CodeError = CodeError {
        error_code: 40,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Invalid path!",
        log_level: Level::INFO,
    };
    pub const USER_NOT_FOUND: CodeError = CodeError {
        error_code: 41,
        http_status_code: StatusCode::NOT_FOUND,
        message: "User not found.",
        log_level: Level::INFO,
    };
    pub const POST_NOT_FOUND: CodeError = CodeError {
        error_code: 42,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Post not found",
        log_level: Level::INFO,
    };
    pub const CATEGORY_NOT_FOUND: CodeError = CodeError {
        error_code: 43,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Category not found",
        log_level: Level::INFO,
    };

    // 409 / 410
    pub const EMAIL_MUST_BE_UNIQUE: CodeError = CodeError {
        error_code: 50,
        http_status_code: StatusCode::CONFLICT,
        message: "This email is already registered.",
        log_level: Level::INFO,
    };
    pub const VERIFICATION_CODE_EXPIRED: CodeError = CodeError {
        error_code: 51,
        http_status_code: StatusCode::GONE,
        message: "The verification code has expired.",
        log_level: Level::INFO,
    };
    pub const RESET_CODE_EXPIRED: CodeError = CodeError {
        error_code: 52,
        http_status_code: StatusCode::GONE,
        message: "The reset code has expired.",
        log_level: Level::INFO,
    };

    // 422
    pub const VALIDATION_FAILED: CodeError = CodeError {
        error_code: 60,
        http_status_code: StatusCode::UNPROCESSABLE_ENTITY,
        message: "The given data was invalid.",
        log_level: Level::INFO,
    };
    pub const EMAIL_NOT_VERIFIED: CodeError = CodeError {
        error_code: 61,
        http_status_code: StatusCode::UNPROCESSABLE_ENTITY,
        message: "Email is not verified.",
        log_level: Level::INFO,
    };
    pub const INVALID_VERIFICATION_CODE: CodeError = CodeError {
        error_code: 62,
        http_status_code: StatusCode::UNPROCESSABLE_ENTITY,
        message: "Invalid verification code.",
        log_level: Level::INFO,
    };
    pub const INVALID_RESET_CODE: CodeError = CodeError {
        error_code: 63,
        http_status_code: StatusCode::UNPROCESSABLE_ENTITY,
        message: "Invalid reset code.",
        log_level: Level::INFO,
    };
    pub const PARENT_CATEGORY_NOT_FOUND: CodeError = CodeError {
        error_code: 64,
        http_status_code: StatusCode::UNPROCESSABLE_ENTITY,
        message: "The selected parent id is invalid.",
        log_level: Level::INFO,
    };
}

pub fn code_err(cerr: CodeError, e: impl ToString) -> CodeErrorResp {
    CodeErrorResp {
        error_code: cerr.error_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message,
        detail: e.to_string(),
        errors: None,
        log_level: cerr.log_level,
    }
}

/// 422 carrying per-field messages.
pub fn validation_err(errors: FieldErrors) -> CodeErrorResp {
    let detail = errors.keys().cloned().collect::<Vec<_>>().join(",");
    CodeErrorResp {
        errors: Some(errors),
        ..code_err(CodeError::VALIDATION_FAILED, detail)
    }
}

#[derive(Debug)]
pub struct CodeErrorResp {
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
    pub detail: String,
    pub errors: Option<FieldErrors>,
    pub log_level: Level,
}

/// Client-facing shape; internal `detail` is logged, not serialized.
#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl From<CodeError> for CodeErrorResp {
    fn from(cerr: CodeError) -> Self {
        code_err(cerr, "")
    }
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.detail)
    }
}

impl Error for CodeErrorResp {}

fn header_safe(value: &str) -> HeaderValue {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_str(&cleaned).unwrap_or_else(|_| HeaderValue::from_static(""))
}

impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            message: self.message,
            errors: self.errors.as_ref(),
        };

        // picked up and stripped by the logging middleware
        let mut headers = HeaderMap::new();
        headers.insert("x-error-log-level", header_safe(self.log_level.as_str()));
        headers.insert(
            "x-error-status-code",
            header_safe(self.http_status_code.as_str()),
        );
        headers.insert("x-error-code", header_safe(&self.error_code.to_string()));
        headers.insert("x-error-message", header_safe(self.message));
        headers.insert("x-error-detail", header_safe(&self.detail));

        (self.http_status_code, headers, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_detail_is_not_echoed_to_client() {
        let resp = code_err(CodeError::DB_QUERY_ERROR, "relation \"users\" does not exist")
            .into_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get("x-error-detail").unwrap(),
            "relation \"users\" does not exist"
        );

        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({ "message": "Database query failed!" }));
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed_per_field() {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), vec!["The email field is required.".into()]);

        let resp = validation_err(errors).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "The given data was invalid.");
        assert_eq!(json["errors"]["email"][0], "The email field is required.");
    }

    #[test]
    fn test_expired_codes_map_to_gone() {
        let resp: CodeErrorResp = CodeError::VERIFICATION_CODE_EXPIRED.into();
        assert_eq!(resp.http_status_code, StatusCode::GONE);
        assert_eq!(resp.log_level, Level::INFO);
    }

    #[test]
    fn test_multiline_detail_still_fits_in_header() {
        let value = header_safe("line one\nline two");
        assert_eq!(value, "line one line two");
    }
}
