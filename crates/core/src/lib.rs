//! Core types and configuration for the investor flow pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Raw and canonical trade rows, investor categories
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
