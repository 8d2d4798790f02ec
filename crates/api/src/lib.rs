//! HumanTic API Library
//!
//! This crate contains the HTTP API server components for HumanTic.

pub mod auth;
pub mod config;
pub mod error;
pub mod journey;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
