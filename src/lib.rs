//! Seqforge - Numbered image sequence dataset auditing and packaging
//!
//! This library crate exposes the core functionality for integration testing.

pub mod archive;
pub mod check;
pub mod config;
pub mod elapsed;
pub mod error;
pub mod extract;
pub mod listing;
pub mod movies;
pub mod sample;
pub mod sheets;

pub use error::{Error, Result};
