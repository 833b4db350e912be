//! bcrypt hashing, run on the blocking pool.

use crate::error::AuthError;

pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hash = hash_password("111".to_string(), 4).await.unwrap();

        assert_ne!(hash, "111");
        assert!(verify_password("111".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("112".to_string(), hash).await.unwrap());
    }
}
