//! # Kaktus Common Library
//!
//! Shared code for the Kaktus review analytics services:
//! - Common error type
//! - TOML configuration loading with compiled defaults

pub mod config;
pub mod error;

pub use error::{Error, Result};
