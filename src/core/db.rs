//! Database layer for guacman.
//!
//! One `Db` wraps one PostgreSQL session. Every mutating operation runs as
//! a single transaction: statements propagate errors with `?`, and a
//! transaction dropped before `commit` rolls back.

use std::collections::BTreeMap;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection, Row};

use crate::core::config::DatabaseConfig;
use crate::core::error::{GuacError, Result};

/// Remote-desktop protocols this tool knows how to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Rdp,
    Vnc,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Rdp => "rdp",
            Protocol::Vnc => "vnc",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = GuacError;

    /// Case-insensitive parse; anything but `rdp`/`vnc` is unsupported.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rdp" => Ok(Protocol::Rdp),
            "vnc" => Ok(Protocol::Vnc),
            other => Err(GuacError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// A connection record as rendered by `list`: the registry row plus its
/// folded parameter map.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectionRecord {
    pub id: i32,
    pub name: String,
    pub protocol: String,
    pub parameters: BTreeMap<String, String>,
}

/// One row of the connection/parameter LEFT JOIN. Parameter columns are
/// NULL for connections without parameters.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub id: i32,
    pub name: String,
    pub protocol: String,
    pub parameter_name: Option<String>,
    pub parameter_value: Option<String>,
}

/// Fold the flat join result into one record per connection, preserving
/// first-seen order (the query orders by connection name).
pub fn fold_rows(rows: Vec<JoinedRow>) -> Vec<ConnectionRecord> {
    let mut records: Vec<ConnectionRecord> = Vec::new();
    let mut index: std::collections::HashMap<i32, usize> = std::collections::HashMap::new();

    for row in rows {
        let pos = match index.get(&row.id) {
            Some(&pos) => pos,
            None => {
                records.push(ConnectionRecord {
                    id: row.id,
                    name: row.name.clone(),
                    protocol: row.protocol.clone(),
                    parameters: BTreeMap::new(),
                });
                index.insert(row.id, records.len() - 1);
                records.len() - 1
            }
        };

        if let (Some(name), Some(value)) = (row.parameter_name, row.parameter_value) {
            records[pos].parameters.insert(name, value);
        }
    }

    records
}

/// A single database session.
pub struct Db {
    conn: PgConnection,
}

impl Db {
    /// Open a new session using the resolved database configuration.
    ///
    /// The port is parsed here; the config deliberately keeps it a string.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self> {
        let port: u16 = cfg
            .port
            .parse()
            .map_err(|_| GuacError::InvalidPort(cfg.port.clone()))?;

        let options = PgConnectOptions::new()
            .host(&cfg.host)
            .port(port)
            .database(&cfg.name)
            .username(&cfg.user)
            .password(&cfg.password);

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(GuacError::Connect)?;

        Ok(Self { conn })
    }

    /// Close the session gracefully.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Insert a connection row and its parameter rows in one transaction.
    /// Returns the store-generated connection id.
    pub async fn create_connection(
        &mut self,
        name: &str,
        protocol: Protocol,
        parameters: &[(String, String)],
    ) -> Result<i32> {
        let mut tx = self.conn.begin().await?;

        let row = sqlx::query(
            "INSERT INTO guacamole_connection (connection_name, protocol)
             VALUES ($1, $2) RETURNING connection_id",
        )
        .bind(name)
        .bind(protocol.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let connection_id: i32 = row.try_get("connection_id")?;

        for (param_name, param_value) in parameters {
            sqlx::query(
                "INSERT INTO guacamole_connection_parameter
                     (connection_id, parameter_name, parameter_value)
                 VALUES ($1, $2, $3)",
            )
            .bind(connection_id)
            .bind(param_name)
            .bind(param_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(connection_id)
    }

    /// Fetch all connections with their parameters, ordered by connection
    /// name then parameter name.
    pub async fn fetch_connections(&mut self) -> Result<Vec<ConnectionRecord>> {
        let rows = sqlx::query(
            "SELECT c.connection_id, c.connection_name, c.protocol,
                    cp.parameter_name, cp.parameter_value
             FROM guacamole_connection c
             LEFT JOIN guacamole_connection_parameter cp
                    ON c.connection_id = cp.connection_id
             ORDER BY c.connection_name, cp.parameter_name",
        )
        .fetch_all(&mut self.conn)
        .await?;

        let joined = rows
            .iter()
            .map(|row| {
                Ok(JoinedRow {
                    id: row.try_get("connection_id")?,
                    name: row.try_get("connection_name")?,
                    protocol: row.try_get("protocol")?,
                    parameter_name: row.try_get("parameter_name")?,
                    parameter_value: row.try_get("parameter_value")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(fold_rows(joined))
    }

    /// Delete a connection and its parameters in one transaction.
    ///
    /// The store is not assumed to cascade, so parameter rows go first. A
    /// zero row count on the connection delete means the id does not
    /// exist; nothing is committed in that case.
    pub async fn delete_connection(&mut self, connection_id: i32) -> Result<()> {
        let mut tx = self.conn.begin().await?;

        sqlx::query("DELETE FROM guacamole_connection_parameter WHERE connection_id = $1")
            .bind(connection_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM guacamole_connection WHERE connection_id = $1")
            .bind(connection_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GuacError::ConnectionNotFound(connection_id));
        }

        tx.commit().await?;
        Ok(())
    }
}
