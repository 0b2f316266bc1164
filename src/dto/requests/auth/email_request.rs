use serde_derive::Deserialize;

/// Body of `send-code` and `password/reset`.
#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}
