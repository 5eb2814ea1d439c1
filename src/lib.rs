// Public API for integration tests and the terminal client

pub mod api;
pub mod auth;
pub mod client;
pub mod cloud;
pub mod config;
pub mod error;
pub mod moderation;
pub mod protocol;
pub mod service;
pub mod store;
pub mod types;
