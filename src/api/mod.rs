pub mod auth;
pub mod error;
pub mod pages;
pub mod server;
