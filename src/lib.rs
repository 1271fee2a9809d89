pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod services;
