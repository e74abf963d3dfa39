use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Hashes on the blocking thread pool so the request workers keep serving.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    web::block(move || hash_password(&password, cost)).await?
}

pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    web::block(move || verify_password(&password, &hashed_password)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_BCRYPT_COST, MIN_BCRYPT_COST};

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password, DEFAULT_BCRYPT_COST).unwrap();

        assert_ne!(hashed, password);
        assert!(hashed.starts_with("$2b$12$"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same_password", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("same_password", MIN_BCRYPT_COST).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$2b$04$"));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[actix_rt::test]
    async fn test_blocking_helpers() {
        let hashed = hash_password_blocking("hunter2hunter2".into(), MIN_BCRYPT_COST)
            .await
            .unwrap();
        assert!(verify_password_blocking("hunter2hunter2".into(), hashed.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("hunter3hunter3".into(), hashed)
            .await
            .unwrap());
    }
}
