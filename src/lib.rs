//! guacman - Apache Guacamole connection-record manager library.
//!
//! Contains the configuration, database and import logic behind the
//! `guacman` CLI.

pub mod cli;
pub mod core;
