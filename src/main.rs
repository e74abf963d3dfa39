use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};

use taskboard::config::Config;
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::PgStore;

/// One line per request: start time, client ip, request line, status.
const ACCESS_LOG_FORMAT: &str = "%t | %a | %r | %s";

fn io_error<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::Other, error)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io_error)?;

    let store = PgStore::connect(&config.database_url, 10)
        .await
        .map_err(io_error)?;
    store.migrate().await.map_err(io_error)?;
    log::info!("database ready");

    let state = web::Data::new(AppState::from_config(Arc::new(store), &config));

    log::info!("Starting TaskBoard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .configure(routes::config)
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
