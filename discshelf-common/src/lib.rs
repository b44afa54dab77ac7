//! # discshelf common library
//!
//! Shared code for the discshelf service and its tests:
//! - Error type and result alias
//! - Bootstrap configuration (TOML, root folder resolution)
//! - Database initialization and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
