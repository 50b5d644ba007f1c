//! CLI commands module.

pub mod config;
pub mod exec;
pub mod start;
pub mod status;
pub mod stop;
