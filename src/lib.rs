pub mod admin;
pub mod config;
pub mod core;
pub mod main_module;
pub mod reports;
pub mod security;
pub mod tickets;

pub use crate::core::shared;
