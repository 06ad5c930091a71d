pub mod config;
pub mod explorer;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
