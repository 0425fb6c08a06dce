//! Core utilities shared by the picpik crates
//!
//! This crate provides the pieces every other crate leans on:
//!
//! - **Error handling**: structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration for limits, resizing, and logging
//! - **Retry**: bounded async retry around flaky steps
//!
//! # Example
//!
//! ```rust,no_run
//! use picpik_core::config::Config;
//!
//! let config = Config::load(None).expect("config should parse");
//! println!("resize attempts: {}", config.schema.resize.max_attempts);
//! ```

pub mod config;
pub mod error;
pub mod retry;

pub use error::{exit_codes, Error, ErrorCode, Result};

