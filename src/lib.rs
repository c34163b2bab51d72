pub mod attendance;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod report;
pub mod time;

pub use error::{AppError, Result};
