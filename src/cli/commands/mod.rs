pub mod auth;
pub mod category;
pub mod health;
pub mod init;
pub mod product;
pub mod server;
