pub mod app;
pub mod config;
pub mod me;
pub mod primary_address;
pub mod quick_auth;
