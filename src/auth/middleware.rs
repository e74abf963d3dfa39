use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{bearer_token, TOKEN_REQUIRED};
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Rejects requests without a valid bearer token for an existing user.
///
/// On success the resolved [`User`] is stored in the request extensions, where
/// [`crate::auth::AuthenticatedUser`] picks it up. Every rejection looks the same to the
/// client: `403 {"error": "JWT Token required"}`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match authenticate(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(app_err) => Ok(req.error_response(app_err).map_into_right_body()),
            }
        })
    }
}

fn rejected() -> AppError {
    AppError::Forbidden(TOKEN_REQUIRED.into())
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("AppState is not registered".into()))?;

    let token = bearer_token(req.headers()).ok_or_else(|| {
        log::debug!("{} {}: missing bearer token", req.method(), req.path());
        rejected()
    })?;

    let claims = state.tokens.verify_token(token).map_err(|e| {
        log::debug!("{} {}: {}", req.method(), req.path(), e);
        rejected()
    })?;

    // A token for a user that no longer exists is just as invalid as a forged one.
    state
        .store
        .find_user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| {
            log::debug!("token references unknown user {}", claims.user_id);
            rejected()
        })
}
