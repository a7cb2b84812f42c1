//! Layered configuration for guacman.
//!
//! Options resolve once at startup: hard-coded default, overridden by a
//! named environment variable, overridden by the INI config file when one
//! is given. The resolved struct is injected into the manager; nothing
//! reads the environment after startup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::error::{GuacError, Result};

/// Parsed INI content: section name -> key -> value.
pub type IniSections = HashMap<String, HashMap<String, String>>;

/// Database session settings (`[database]` section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    /// Kept as a string; parsed only when the session is opened.
    pub port: String,
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Gateway settings (`[guacamole]` section).
///
/// Carried for completeness; no current operation talks to the gateway
/// beyond storing its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub url: String,
    pub admin_user: String,
    pub admin_password: String,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
}

impl Config {
    /// Resolve configuration from an optional INI file and the process
    /// environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let sections = match config_file {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|_| GuacError::ConfigFileNotFound(path.to_path_buf()))?;
                Some(parse_ini(&content))
            }
            None => None,
        };

        let env: HashMap<String, String> = std::env::vars().collect();
        Ok(Self::from_layers(sections.as_ref(), &env))
    }

    /// Build a config from already-parsed layers. Split out from [`load`]
    /// so tests can inject the environment.
    ///
    /// [`load`]: Config::load
    pub fn from_layers(file: Option<&IniSections>, env: &HashMap<String, String>) -> Self {
        let layer = |section: &str, key: &str, env_var: &str, default: &str| -> String {
            file.and_then(|s| s.get(section))
                .and_then(|s| s.get(key))
                .cloned()
                .or_else(|| env.get(env_var).cloned())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            database: DatabaseConfig {
                host: layer("database", "host", "DB_HOST", "172.22.18.10"),
                port: layer("database", "port", "DB_PORT", "5432"),
                name: layer("database", "name", "DB_NAME", "guacamole_db"),
                user: layer("database", "user", "DB_USER", "guacamole_user"),
                password: layer("database", "password", "POSTGRES_PASSWORD", ""),
            },
            gateway: GatewayConfig {
                url: layer(
                    "guacamole",
                    "url",
                    "GUACAMOLE_URL",
                    "http://172.22.18.12:8080/guacamole",
                ),
                admin_user: layer(
                    "guacamole",
                    "admin_user",
                    "DEFAULT_ADMIN_USERNAME",
                    "guacadmin",
                ),
                admin_password: layer(
                    "guacamole",
                    "admin_password",
                    "DEFAULT_ADMIN_PASSWORD",
                    "guacadmin",
                ),
            },
        }
    }
}

/// Parse INI-style content into sections.
///
/// `[section]` headers, `key = value` lines, `#`/`;` comments. Section and
/// key names are lowercased; keys outside any section are dropped.
pub fn parse_ini(content: &str) -> IniSections {
    let mut sections: IniSections = HashMap::new();
    let mut current_section: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let section_name = line[1..line.len() - 1].to_lowercase();
            sections.entry(section_name.clone()).or_default();
            current_section = Some(section_name);
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim().to_lowercase();
            let value = line[eq_pos + 1..].trim().to_string();

            if let Some(ref section) = current_section {
                sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key, value);
            }
        }
    }

    sections
}
