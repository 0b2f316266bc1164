use anyhow::Result;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use zeroize::Zeroize;

pub async fn hash_pw(mut password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let hashed = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|password_hash| password_hash.to_string())
            .map_err(|e| anyhow::anyhow!(e));
        password.zeroize();
        hashed
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::crypto::verify_pw::verify_pw;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = hash_pw("correct horse".to_owned()).await.unwrap();
        assert!(hashed.starts_with("$argon2"));

        assert!(verify_pw("correct horse", &hashed).await.unwrap());
        assert!(!verify_pw("battery staple", &hashed).await.unwrap());
    }
}
