use serde_derive::Serialize;

use crate::domain::user::User;

#[derive(Serialize)]
pub struct UserUpdateResponse {
    pub message: &'static str,
    pub user: User,
}
