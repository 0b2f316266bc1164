use anyhow::Result;
use argon2::{Argon2, PasswordVerifier, password_hash::PasswordHash};

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unparseable.
pub async fn verify_pw(password: &str, expected_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let expected_hash = expected_hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed_hash =
            PasswordHash::new(&expected_hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!(e.to_string())),
        }
    })
    .await?
}
