use serde_derive::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    domain::user::USER_TYPE_MAX_LEN, errors::code_error::CodeErrorResp,
    util::string::validations::Validator,
};

/// Shared by `PUT /user`, `POST /users/new` and `PUT /users/{id}`; each handler
/// decides which fields are required.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct UserFormRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UserFormRequest {
    /// Rules for `POST /users/new`.
    pub fn validate_create(&self) -> Result<(), CodeErrorResp> {
        Validator::new()
            .email("email", self.email.as_deref())
            .required("first_name", self.first_name.as_deref())
            .required("last_name", self.last_name.as_deref())
            .sometimes("nickname", self.nickname.as_deref())
            .sometimes("type", self.user_type.as_deref())
            .max_len("type", self.user_type.as_deref(), USER_TYPE_MAX_LEN)
            .required("password", self.password.as_deref())
            .confirmed(
                "password",
                self.password.as_deref(),
                self.password_confirmation.as_deref(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_type: &str) -> UserFormRequest {
        serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "type": user_type,
            "password": "analytical",
            "password_confirmation": "analytical",
        }))
        .unwrap()
    }

    #[test]
    fn test_type_fits_column() {
        assert!(request("admin").validate_create().is_ok());

        let err = request(&"a".repeat(USER_TYPE_MAX_LEN + 1))
            .validate_create()
            .unwrap_err();
        assert_eq!(err.http_status_code, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.errors.unwrap().contains_key("type"));
    }
}
