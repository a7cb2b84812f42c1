//! Connection manager: the high-level operations behind each CLI command.
//!
//! Holds the resolved configuration and opens one fresh database session
//! per operation, so a single invocation never shares store state with
//! another.

use std::path::Path;

use crate::core::config::Config;
use crate::core::db::{ConnectionRecord, Db, Protocol};
use crate::core::error::Result;
use crate::core::import;

/// Default RDP port.
pub const DEFAULT_RDP_PORT: u16 = 3389;
/// Default VNC port.
pub const DEFAULT_VNC_PORT: u16 = 5900;

/// Everything needed to provision one RDP connection.
#[derive(Debug, Clone)]
pub struct RdpConnectionSpec {
    pub name: String,
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub domain: Option<String>,
    pub port: u16,
    pub display: RdpDisplayOptions,
}

/// Overridable RDP display parameters. The CLI always uses the defaults;
/// library callers can tune them.
#[derive(Debug, Clone)]
pub struct RdpDisplayOptions {
    pub enable_wallpaper: bool,
    pub enable_theming: bool,
    pub enable_font_smoothing: bool,
    pub color_depth: String,
    pub resize_method: String,
}

impl Default for RdpDisplayOptions {
    fn default() -> Self {
        Self {
            enable_wallpaper: false,
            enable_theming: false,
            enable_font_smoothing: false,
            color_depth: "16".to_string(),
            resize_method: "reconnect".to_string(),
        }
    }
}

/// Everything needed to provision one VNC connection.
#[derive(Debug, Clone)]
pub struct VncConnectionSpec {
    pub name: String,
    pub hostname: String,
    pub password: String,
    pub port: u16,
    pub display: VncDisplayOptions,
}

/// Overridable VNC display parameters.
#[derive(Debug, Clone)]
pub struct VncDisplayOptions {
    pub color_depth: String,
    pub swap_red_blue: bool,
    pub cursor: String,
    pub autoretry: String,
}

impl Default for VncDisplayOptions {
    fn default() -> Self {
        Self {
            color_depth: "16".to_string(),
            swap_red_blue: false,
            cursor: "local".to_string(),
            autoretry: "5".to_string(),
        }
    }
}

fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// The parameter rows stored for an RDP connection.
pub fn rdp_parameters(spec: &RdpConnectionSpec) -> Vec<(String, String)> {
    let mut params = vec![
        ("hostname".to_string(), spec.hostname.clone()),
        ("port".to_string(), spec.port.to_string()),
        ("username".to_string(), spec.username.clone()),
        ("password".to_string(), spec.password.clone()),
        ("security".to_string(), "rdp".to_string()),
        ("ignore-cert".to_string(), "true".to_string()),
        ("enable-drive".to_string(), "true".to_string()),
        ("drive-path".to_string(), "/srv/guacamole".to_string()),
        ("create-drive-path".to_string(), "true".to_string()),
        (
            "enable-wallpaper".to_string(),
            bool_param(spec.display.enable_wallpaper),
        ),
        (
            "enable-theming".to_string(),
            bool_param(spec.display.enable_theming),
        ),
        (
            "enable-font-smoothing".to_string(),
            bool_param(spec.display.enable_font_smoothing),
        ),
        ("color-depth".to_string(), spec.display.color_depth.clone()),
        (
            "resize-method".to_string(),
            spec.display.resize_method.clone(),
        ),
    ];

    if let Some(ref domain) = spec.domain {
        params.push(("domain".to_string(), domain.clone()));
    }

    params
}

/// The parameter rows stored for a VNC connection.
pub fn vnc_parameters(spec: &VncConnectionSpec) -> Vec<(String, String)> {
    vec![
        ("hostname".to_string(), spec.hostname.clone()),
        ("port".to_string(), spec.port.to_string()),
        ("password".to_string(), spec.password.clone()),
        ("color-depth".to_string(), spec.display.color_depth.clone()),
        (
            "swap-red-blue".to_string(),
            bool_param(spec.display.swap_red_blue),
        ),
        ("cursor".to_string(), spec.display.cursor.clone()),
        ("autoretry".to_string(), spec.display.autoretry.clone()),
    ]
}

/// Summary of a bulk import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// High-level operations over the connection registry.
pub struct ConnectionManager {
    config: Config,
}

impl ConnectionManager {
    /// Create a manager around a resolved configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn open_session(&self) -> Result<Db> {
        Db::connect(&self.config.database).await
    }

    /// Insert an RDP connection and its parameter set. Returns the
    /// store-generated connection id.
    pub async fn add_rdp_connection(&self, spec: &RdpConnectionSpec) -> Result<i32> {
        let mut db = self.open_session().await?;
        let params = rdp_parameters(spec);
        let id = db.create_connection(&spec.name, Protocol::Rdp, &params).await?;
        db.close().await?;
        Ok(id)
    }

    /// Insert a VNC connection and its parameter set. Returns the
    /// store-generated connection id.
    pub async fn add_vnc_connection(&self, spec: &VncConnectionSpec) -> Result<i32> {
        let mut db = self.open_session().await?;
        let params = vnc_parameters(spec);
        let id = db.create_connection(&spec.name, Protocol::Vnc, &params).await?;
        db.close().await?;
        Ok(id)
    }

    /// List all connections with their parameter maps.
    pub async fn list_connections(&self) -> Result<Vec<ConnectionRecord>> {
        let mut db = self.open_session().await?;
        let records = db.fetch_connections().await?;
        db.close().await?;
        Ok(records)
    }

    /// Delete a connection and its parameters.
    /// A nonexistent id is `GuacError::ConnectionNotFound`.
    pub async fn delete_connection(&self, connection_id: i32) -> Result<()> {
        let mut db = self.open_session().await?;
        db.delete_connection(connection_id).await?;
        db.close().await?;
        Ok(())
    }

    /// Import connections from a CSV file with a header row.
    ///
    /// Rows are handled independently: an unsupported protocol, a missing
    /// required field or a per-row store failure logs a warning and counts
    /// as skipped. Only an unreadable file aborts the import.
    pub async fn import_csv(&self, path: &Path) -> Result<ImportSummary> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut summary = ImportSummary::default();

        for (idx, result) in reader.deserialize::<import::ImportRow>().enumerate() {
            // Header occupies line 1
            let line = idx as u64 + 2;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(line, "skipping malformed row: {}", e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let spec = match import::validate_row(&row, line) {
                Ok(spec) => spec,
                Err(e) => {
                    tracing::warn!(line, "skipping row: {}", e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let added = match &spec {
                import::RowSpec::Rdp(rdp) => self.add_rdp_connection(rdp).await,
                import::RowSpec::Vnc(vnc) => self.add_vnc_connection(vnc).await,
            };

            match added {
                Ok(id) => {
                    tracing::debug!(line, id, "imported {}", spec.name());
                    summary.imported += 1;
                }
                Err(e) => {
                    tracing::warn!(line, "skipping row, store rejected it: {}", e);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}
