pub mod auth;
pub mod index;
pub mod tags;
pub mod tasks;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus the extractor configs that route body and query
/// failures into the JSON error envelope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(index::index)
    .service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::verify_token),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::patch_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/tags")
            .wrap(AuthMiddleware)
            .service(tags::list_tags)
            .service(tags::get_tag),
    );
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not found".into()))
}

/// Ids that do not parse cannot exist, so they are reported as missing.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| tasks::task_not_found())
}

fn parse_tag_id(raw: &str) -> Result<i32, AppError> {
    raw.parse().map_err(|_| tags::tag_not_found())
}
