//! guacman - Apache Guacamole connection-record manager
//!
//! A CLI tool that maintains connection records in the relational schema
//! consumed by a Guacamole gateway.

#[tokio::main]
async fn main() {
    if let Err(e) = guacman::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
