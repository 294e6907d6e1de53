pub mod auth;
pub mod catalog;
pub mod home;
pub mod resource;
