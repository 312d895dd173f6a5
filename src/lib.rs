pub mod auth;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod health;
pub mod http_client;
pub mod items;
pub mod routes;
pub mod server;
pub mod service;
pub mod shutdown;

pub use config::Config;
pub use error::AppError;
pub use server::Server;
pub use service::HubspotService;
