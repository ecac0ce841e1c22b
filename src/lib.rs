pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod render;
pub mod repository;
pub mod state;
pub mod validation;

pub use app::app;
pub use config::AppConfig;
pub use state::AppState;

#[cfg(test)]
pub mod testing;
