pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod notify;
pub mod resource;
pub mod shell;
pub mod types;

#[cfg(test)]
pub mod testing;
