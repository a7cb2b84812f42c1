//! Integration tests for guacman's import and configuration paths.
//!
//! Everything that needs a live PostgreSQL stays out of this suite; these
//! tests cover the CSV and config handling end to end through the library
//! API, reading real files from disk.

use std::collections::HashMap;
use std::io::Write;

use tempfile::NamedTempFile;

use guacman::core::config::{parse_ini, Config};
use guacman::core::error::GuacError;
use guacman::core::import::{validate_row, ImportRow, RowSpec};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Read a CSV file the way the import loop does and validate each row.
fn validate_file(file: &NamedTempFile) -> Vec<Result<RowSpec, GuacError>> {
    let mut reader = csv::Reader::from_path(file.path()).unwrap();
    reader
        .deserialize::<ImportRow>()
        .enumerate()
        .map(|(idx, row)| {
            let line = idx as u64 + 2;
            validate_row(&row.unwrap(), line)
        })
        .collect()
}

#[test]
fn test_mixed_csv_one_valid_one_unsupported() {
    let file = write_csv(
        "protocol,name,hostname,username,password,domain,port\n\
         rdp,web-server,10.0.0.1,admin,pw,,\n\
         telnet,legacy-switch,10.0.0.9,,,,\n",
    );

    let outcomes = validate_file(&file);
    assert_eq!(outcomes.len(), 2);

    match &outcomes[0] {
        Ok(RowSpec::Rdp(spec)) => {
            assert_eq!(spec.name, "web-server");
            assert_eq!(spec.hostname, "10.0.0.1");
            assert_eq!(spec.port, 3389);
        }
        other => panic!("expected valid rdp row, got {other:?}"),
    }

    match &outcomes[1] {
        Err(GuacError::UnsupportedProtocol(p)) => assert_eq!(p, "telnet"),
        other => panic!("expected unsupported protocol, got {other:?}"),
    }
}

#[test]
fn test_csv_protocol_column_defaults_to_rdp() {
    let file = write_csv(
        "name,hostname,username,password\n\
         plain,10.1.1.1,user,pw\n",
    );

    let outcomes = validate_file(&file);
    assert!(matches!(&outcomes[0], Ok(RowSpec::Rdp(_))));
}

#[test]
fn test_csv_vnc_row_with_port_override() {
    let file = write_csv(
        "protocol,name,hostname,password,port\n\
         vnc,screen,10.0.0.5,secret,5901\n",
    );

    let outcomes = validate_file(&file);
    match &outcomes[0] {
        Ok(RowSpec::Vnc(spec)) => {
            assert_eq!(spec.hostname, "10.0.0.5");
            assert_eq!(spec.port, 5901);
        }
        other => panic!("expected vnc row, got {other:?}"),
    }
}

#[test]
fn test_csv_row_missing_required_field_is_rejected_not_fatal() {
    let file = write_csv(
        "protocol,name,hostname,username,password\n\
         rdp,incomplete,10.0.0.2,,\n\
         rdp,complete,10.0.0.3,admin,pw\n",
    );

    let outcomes = validate_file(&file);
    assert!(matches!(
        &outcomes[0],
        Err(GuacError::MissingColumn { line: 2, .. })
    ));
    // The following row still validates on its own
    assert!(matches!(&outcomes[1], Ok(RowSpec::Rdp(_))));
}

#[test]
fn test_config_file_layering_end_to_end() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[database]\n\
         host = db.example.org\n\
         name = guac_test\n\
         \n\
         [guacamole]\n\
         admin_user = operator\n"
    )
    .unwrap();

    let cfg = Config::load(Some(file.path())).unwrap();
    assert_eq!(cfg.database.host, "db.example.org");
    assert_eq!(cfg.database.name, "guac_test");
    assert_eq!(cfg.gateway.admin_user, "operator");
    // Keys the file does not set fall back (possibly through env) without error
    assert!(!cfg.database.port.is_empty());
}

#[test]
fn test_ini_sections_round_trip_through_layers() {
    let sections = parse_ini("[database]\nport = 6543\n");
    let env = HashMap::new();

    let cfg = Config::from_layers(Some(&sections), &env);
    assert_eq!(cfg.database.port, "6543");
    // Defaults intact elsewhere
    assert_eq!(cfg.database.user, "guacamole_user");
}
