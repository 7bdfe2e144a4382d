use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "dockhand",
    about = "Removes Docker containers left behind by deleted workspace machines",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Configuration file, defaults to ~/.config/dockhand/config.toml
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the periodic cleanup until interrupted
    Run,

    /// Run a single cleanup pass and print what it did
    Clean,

    /// List containers along with the workspace machine their name encodes
    Ps,

    /// Show the Docker daemon's version and system information
    Info,

    /// Encode or decode workspace container names
    #[clap(subcommand)]
    Name(NameCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum NameCommand {
    /// Build the container name for a machine
    Encode {
        user_name: String,
        workspace_id: String,
        machine_id: String,
        machine_name: String,
    },

    /// Split a container name into its parts
    Decode { name: String },
}
