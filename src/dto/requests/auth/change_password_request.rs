use serde_derive::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::verify_code_request::CodeInput;

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ChangePasswordRequest {
    pub email: Option<String>,
    pub code: Option<CodeInput>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}
