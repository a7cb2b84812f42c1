//! CLI interface for guacman.

pub mod output;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::core::error::{GuacError, Result};
use crate::core::manager::{
    ConnectionManager, RdpConnectionSpec, RdpDisplayOptions, VncConnectionSpec,
    VncDisplayOptions, DEFAULT_RDP_PORT, DEFAULT_VNC_PORT,
};

/// guacman - Apache Guacamole connection-record manager
#[derive(Parser, Debug)]
#[command(name = "guacman")]
#[command(about = "Manage remote-desktop connection records for a Guacamole gateway", long_about = None)]
struct Cli {
    /// Configuration file path (INI)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an RDP connection
    AddRdp {
        /// Connection name
        name: String,
        /// Server hostname/IP
        hostname: String,
        /// Username
        username: String,
        /// Password
        password: String,
        /// Domain name
        #[arg(long)]
        domain: Option<String>,
        /// RDP port
        #[arg(long, default_value_t = DEFAULT_RDP_PORT)]
        port: u16,
    },

    /// Add a VNC connection
    AddVnc {
        /// Connection name
        name: String,
        /// Server hostname/IP
        hostname: String,
        /// VNC password
        password: String,
        /// VNC port
        #[arg(long, default_value_t = DEFAULT_VNC_PORT)]
        port: u16,
    },

    /// List all connections
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// Delete a connection
    Delete {
        /// Connection ID to delete
        connection_id: i32,
    },

    /// Import connections from a CSV file
    Import {
        /// CSV file path
        csv_file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Table,
    Json,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // No command prints help and exits normally
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let manager = ConnectionManager::new(config);

    match command {
        Command::AddRdp {
            name,
            hostname,
            username,
            password,
            domain,
            port,
        } => {
            let spec = RdpConnectionSpec {
                name,
                hostname,
                username,
                password,
                domain,
                port,
                display: RdpDisplayOptions::default(),
            };
            let id = manager.add_rdp_connection(&spec).await?;
            println!("RDP connection '{}' added with ID: {}", spec.name, id);
        }

        Command::AddVnc {
            name,
            hostname,
            password,
            port,
        } => {
            let spec = VncConnectionSpec {
                name,
                hostname,
                password,
                port,
                display: VncDisplayOptions::default(),
            };
            let id = manager.add_vnc_connection(&spec).await?;
            println!("VNC connection '{}' added with ID: {}", spec.name, id);
        }

        Command::List { format } => {
            let records = manager.list_connections().await?;
            match format {
                Format::Table => output::format_table(&records),
                Format::Json => println!("{}", output::format_json(&records)?),
            }
        }

        Command::Delete { connection_id } => {
            match manager.delete_connection(connection_id).await {
                Ok(()) => println!("Connection {} deleted", connection_id),
                Err(e @ GuacError::ConnectionNotFound(_)) => {
                    // Not-found is reported plainly, but scripts still get
                    // a distinguishable exit code
                    println!("Connection {} not found", connection_id);
                    std::process::exit(e.exit_code());
                }
                Err(e) => return Err(e),
            }
        }

        Command::Import { csv_file } => {
            let summary = manager.import_csv(&csv_file).await?;
            println!(
                "Imported {} connections from {}",
                summary.imported,
                csv_file.display()
            );
            if summary.skipped > 0 {
                println!("Skipped {} rows (see warnings)", summary.skipped);
            }
        }
    }

    Ok(())
}
