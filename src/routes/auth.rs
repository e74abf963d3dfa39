use crate::{
    auth::{
        bearer_token,
        password::{hash_password_blocking, verify_password_blocking},
        LoginRequest, RegisterRequest, TokenResponse, EMAIL_TAKEN, INVALID_CREDENTIALS,
    },
    error::AppError,
    models::NewUser,
    state::AppState,
};
use actix_web::{post, web, Either, HttpRequest, HttpResponse, Responder};

/// Auth bodies arrive as JSON or as a url-encoded form.
type JsonOrForm<T> = Either<web::Json<T>, web::Form<T>>;

/// Register a new user
///
/// Creates the account and answers `204 No Content`. The client logs in separately.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: JsonOrForm<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let registration = register_data.into_inner().into_registration()?;

    let password_hash = hash_password_blocking(registration.password, state.bcrypt_cost).await?;

    let new_user = NewUser {
        email: registration.email,
        password_hash,
        display_name: registration.display_name,
    };
    match state.store.create_user(new_user).await {
        Ok(user) => {
            log::info!("registered user {}", user.id);
            Ok(HttpResponse::NoContent().finish())
        }
        Err(AppError::Conflict(_)) => Err(AppError::Conflict(EMAIL_TAKEN.into())),
        Err(e) => Err(e),
    }
}

fn invalid_credentials() -> AppError {
    AppError::Forbidden(INVALID_CREDENTIALS.into())
}

/// Login user
///
/// Exchanges an email and password for a bearer token valid for one hour.
/// Unknown emails and wrong passwords get the same answer.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: JsonOrForm<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (email, password) = login_data.into_inner().into_credentials()?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.generate_token(user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Token check
///
/// Answers `ok` for a valid bearer token and `401 nok` for anything else.
#[post("/verify-token")]
pub async fn verify_token(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let valid = bearer_token(req.headers())
        .map(|token| state.tokens.verify_token(token).is_ok())
        .unwrap_or(false);

    if valid {
        HttpResponse::Ok().content_type("text/plain").body("ok")
    } else {
        HttpResponse::Unauthorized()
            .content_type("text/plain")
            .body("nok")
    }
}
