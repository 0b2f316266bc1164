use serde_derive::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
