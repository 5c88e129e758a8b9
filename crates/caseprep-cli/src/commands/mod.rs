pub mod auth_cmd;
pub mod common;
pub mod config;
pub mod contention;
pub mod definition;
pub mod framework;
pub mod list;
pub mod new;
pub mod resolved;
pub mod round;
pub mod show;
