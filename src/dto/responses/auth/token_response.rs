use serde_derive::Serialize;
use uuid::Uuid;

use crate::domain::user::User;

/// Returned by register and login.
#[derive(Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub token: Uuid,
    pub user: User,
}
