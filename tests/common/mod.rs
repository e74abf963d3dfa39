//! Shared setup for the integration tests: an app over a fresh `MemoryStore` and
//! helpers to register, log in and call it.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard::auth::{TokenKeys, TokenResponse};
use taskboard::config::MIN_BCRYPT_COST;
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "3hW2RdkiAgY4biqNxS/u9Nt40P6qAFUEg9PxMxhPdOE";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = web::Data::new(AppState::new(
            store.clone(),
            TokenKeys::new(TEST_SECRET),
            MIN_BCRYPT_COST,
        ));
        Self { store, state }
    }
}

pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .wrap(NormalizePath::trim())
            .configure(routes::config)
            .default_service(web::to(routes::not_found)),
    )
    .await
}

/// Status and raw body of a request.
pub async fn call(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: actix_http::Request,
) -> (StatusCode, String) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Status and JSON body of a request.
pub async fn call_json(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let (status, body) = call(app, req).await;
    let json = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("body is not JSON ({}): {:?}", e, body));
    (status, json)
}

pub fn register_request(email: &str, password: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
            "display_name": "Tester"
        }))
        .to_request()
}

pub fn login_request(email: &str, password: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request()
}

/// Registers `email` with [`PASSWORD`] and returns a fresh bearer token.
pub async fn register_and_login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
) -> String {
    let (status, body) = call(app, register_request(email, PASSWORD)).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "register failed: {}", body);

    let (status, body) = call(app, login_request(email, PASSWORD)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    let response: TokenResponse = serde_json::from_str(&body).expect("login response");
    response.token
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn get(uri: &str, token: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request()
}

pub fn post_json(uri: &str, token: &str, body: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
        .to_request()
}

pub fn patch_json(uri: &str, token: &str, body: Value) -> actix_http::Request {
    test::TestRequest::patch()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
        .to_request()
}

pub fn delete(uri: &str, token: &str) -> actix_http::Request {
    test::TestRequest::delete()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request()
}
