//! CSV row model and per-row validation for bulk import.
//!
//! The file carries a header row with some subset of
//! `protocol,name,hostname,username,password,domain,port`; which columns a
//! row needs depends on its protocol. Validation is pure so it can be
//! tested without a store.

use serde::Deserialize;

use crate::core::db::Protocol;
use crate::core::error::{GuacError, Result};
use crate::core::manager::{
    RdpConnectionSpec, RdpDisplayOptions, VncConnectionSpec, VncDisplayOptions,
    DEFAULT_RDP_PORT, DEFAULT_VNC_PORT,
};

/// One raw CSV row. Every column is optional at parse time; requiredness
/// is per-protocol and checked in [`validate_row`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
}

/// A validated row, ready to hand to the manager.
#[derive(Debug, Clone)]
pub enum RowSpec {
    Rdp(RdpConnectionSpec),
    Vnc(VncConnectionSpec),
}

impl RowSpec {
    pub fn name(&self) -> &str {
        match self {
            RowSpec::Rdp(spec) => &spec.name,
            RowSpec::Vnc(spec) => &spec.name,
        }
    }
}

/// Treat empty and whitespace-only cells the same as absent ones.
fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required(value: &Option<String>, line: u64, column: &'static str) -> Result<String> {
    cell(value)
        .map(str::to_string)
        .ok_or(GuacError::MissingColumn { line, column })
}

fn port_or(value: &Option<String>, default: u16) -> Result<u16> {
    match cell(value) {
        Some(raw) => raw
            .parse()
            .map_err(|_| GuacError::InvalidPort(raw.to_string())),
        None => Ok(default),
    }
}

/// Check one row against its protocol's required columns.
///
/// An absent protocol cell defaults to `rdp`, matching the documented CSV
/// format; unknown protocols surface as `UnsupportedProtocol`.
pub fn validate_row(row: &ImportRow, line: u64) -> Result<RowSpec> {
    let protocol: Protocol = cell(&row.protocol).unwrap_or("rdp").parse()?;

    let name = required(&row.name, line, "name")?;
    let hostname = required(&row.hostname, line, "hostname")?;

    match protocol {
        Protocol::Rdp => Ok(RowSpec::Rdp(RdpConnectionSpec {
            name,
            hostname,
            username: required(&row.username, line, "username")?,
            password: required(&row.password, line, "password")?,
            domain: cell(&row.domain).map(str::to_string),
            port: port_or(&row.port, DEFAULT_RDP_PORT)?,
            display: RdpDisplayOptions::default(),
        })),
        Protocol::Vnc => Ok(RowSpec::Vnc(VncConnectionSpec {
            name,
            hostname,
            password: required(&row.password, line, "password")?,
            port: port_or(&row.port, DEFAULT_VNC_PORT)?,
            display: VncDisplayOptions::default(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> ImportRow {
        let mut row = ImportRow::default();
        for &(key, value) in fields {
            let value = Some(value.to_string());
            match key {
                "protocol" => row.protocol = value,
                "name" => row.name = value,
                "hostname" => row.hostname = value,
                "username" => row.username = value,
                "password" => row.password = value,
                "domain" => row.domain = value,
                "port" => row.port = value,
                other => panic!("unknown column {other}"),
            }
        }
        row
    }

    #[test]
    fn test_rdp_row_with_defaults() {
        let row = row(&[
            ("name", "web"),
            ("hostname", "10.0.0.1"),
            ("username", "admin"),
            ("password", "pw"),
        ]);

        match validate_row(&row, 2).unwrap() {
            RowSpec::Rdp(spec) => {
                assert_eq!(spec.name, "web");
                assert_eq!(spec.port, 3389);
                assert!(spec.domain.is_none());
            }
            RowSpec::Vnc(_) => panic!("expected rdp"),
        }
    }

    #[test]
    fn test_vnc_row() {
        let row = row(&[
            ("protocol", "VNC"),
            ("name", "screen"),
            ("hostname", "10.0.0.5"),
            ("password", "secret"),
            ("port", "5901"),
        ]);

        match validate_row(&row, 2).unwrap() {
            RowSpec::Vnc(spec) => {
                assert_eq!(spec.hostname, "10.0.0.5");
                assert_eq!(spec.port, 5901);
            }
            RowSpec::Rdp(_) => panic!("expected vnc"),
        }
    }

    #[test]
    fn test_unsupported_protocol_is_rejected() {
        let row = row(&[
            ("protocol", "telnet"),
            ("name", "old"),
            ("hostname", "10.0.0.9"),
        ]);

        match validate_row(&row, 3) {
            Err(GuacError::UnsupportedProtocol(p)) => assert_eq!(p, "telnet"),
            other => panic!("expected UnsupportedProtocol, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let row = row(&[("name", "web"), ("hostname", "10.0.0.1")]);

        match validate_row(&row, 4) {
            Err(GuacError::MissingColumn { line, column }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "username");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_cell_counts_as_missing() {
        let row = row(&[
            ("name", "web"),
            ("hostname", "10.0.0.1"),
            ("username", "  "),
            ("password", "pw"),
        ]);

        assert!(matches!(
            validate_row(&row, 5),
            Err(GuacError::MissingColumn {
                column: "username",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let row = row(&[
            ("protocol", "vnc"),
            ("name", "screen"),
            ("hostname", "10.0.0.5"),
            ("password", "pw"),
            ("port", "not-a-port"),
        ]);

        assert!(matches!(
            validate_row(&row, 6),
            Err(GuacError::InvalidPort(_))
        ));
    }
}
