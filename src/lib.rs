pub mod amount;
pub mod app;
pub mod config;
pub mod models;
pub mod notify;
pub mod scraper;
pub mod session;
