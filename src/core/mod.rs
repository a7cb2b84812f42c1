//! Core logic for the guacman connection manager.
//!
//! Everything the CLI layer dispatches to lives here: configuration
//! resolution, the database session, the connection manager and the
//! CSV import loop.

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod manager;

pub use error::{GuacError, Result};
