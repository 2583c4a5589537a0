pub mod analytics;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod github;
pub mod models;
pub mod site;
pub mod storage;

pub use app::build_app;
