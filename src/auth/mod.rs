pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

pub const FIELDS_MANDATORY: &str = "All fields are mandatory";
pub const PASSWORD_TOO_SHORT: &str = "Password must be atleast 8 characters long";
pub const PASSWORDS_DONT_MATCH: &str = "Provided passwords don't match";
pub const EMAIL_INVALID: &str = "The email is not valid";
pub const DISPLAY_NAME_TOO_LONG: &str = "Display name must be at most 100 characters long";
pub const EMAIL_TAKEN: &str = "An account with the provided email already exists";
pub const LOGIN_FIELDS_MANDATORY: &str = "Fields 'email' and 'password' are mandatory";
pub const INVALID_CREDENTIALS: &str = "Email or password incorrect";
pub const TOKEN_REQUIRED: &str = "JWT Token required";

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Represents the payload for a user login request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(email, password)` when both are present and non-empty.
    pub fn into_credentials(self) -> Result<(String, String), AppError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(AppError::BadRequest(LOGIN_FIELDS_MANDATORY.into())),
        }
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

/// A registration that passed every check except email uniqueness.
#[derive(Debug, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl RegisterRequest {
    /// Runs the registration checks in order: presence, password length, password
    /// confirmation, then field formats. The first failure wins.
    pub fn into_registration(self) -> Result<Registration, AppError> {
        let (email, password, confirm_password, display_name) = match (
            non_empty(&self.email),
            non_empty(&self.password),
            non_empty(&self.confirm_password),
            non_empty(&self.display_name),
        ) {
            (Some(e), Some(p), Some(c), Some(d)) => (e, p, c, d),
            _ => return Err(AppError::BadRequest(FIELDS_MANDATORY.into())),
        };

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(PASSWORD_TOO_SHORT.into()));
        }
        if password != confirm_password {
            return Err(AppError::BadRequest(PASSWORDS_DONT_MATCH.into()));
        }
        if let Err(errors) = self.validate() {
            let message = if errors.field_errors().contains_key("email") {
                EMAIL_INVALID
            } else {
                DISPLAY_NAME_TOO_LONG
            };
            return Err(AppError::ValidationError(message.into()));
        }

        Ok(Registration {
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
}
