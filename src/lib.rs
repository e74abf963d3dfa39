#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Personal tasks and shared tags behind a JWT-protected REST API. This crate holds"]
#![doc = "the domain models, the authentication gate, the task query engine, storage and"]
#![doc = "routing. The binary (`main.rs`) wires them to PostgreSQL and an HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
