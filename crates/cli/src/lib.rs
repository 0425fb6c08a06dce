//! Terminal helpers for the picpik command line
//!
//! Provides shared CLI functionality:
//! - Status messages and metadata tables
//! - Progress bars for directory scans

#![warn(missing_docs)]

pub mod output;
pub mod progress;
