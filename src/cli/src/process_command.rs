use crate::commands::{Cli, Commands, NameCommand};
use crate::logging::setup_logging;
use anyhow::{Context, Result};
use clap::Parser;
use dockhand_client::DockerConnector;
use dockhand_common::config_manager::{Config, ConfigLoader};
use dockhand_common::naming;
use dockhand_daemon::{build_registry, CleanupDaemon, ContainerCleaner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();

    // name commands are pure and must work without a reachable daemon or config
    if let Commands::Name(command) = &cli.command {
        return process_name_command(command);
    }

    let config = ConfigLoader::load_config(cli.config.as_deref())?;
    setup_logging(&config)?;

    tokio::runtime::Runtime::new()?.block_on(run_async_command(cli.command, config))
}

fn process_name_command(command: &NameCommand) -> Result<()> {
    match command {
        NameCommand::Encode {
            user_name,
            workspace_id,
            machine_id,
            machine_name,
        } => {
            println!(
                "{}",
                naming::encode(user_name, workspace_id, machine_id, machine_name)
            );
            Ok(())
        }
        NameCommand::Decode { name } => {
            let identity = naming::decode(name)
                .with_context(|| format!("'{name}' is not a workspace container name"))?;
            println!("User:      {}", identity.user_name);
            println!("Workspace: {}", identity.workspace_id);
            println!("Machine:   {}", identity.machine_id);
            println!("Name:      {}", identity.machine_name);
            Ok(())
        }
    }
}

fn build_cleaner(connector: &DockerConnector, config: &Config) -> Result<ContainerCleaner> {
    let registry = build_registry(config)?;
    Ok(ContainerCleaner::new(Arc::new(connector.clone()), registry))
}

pub async fn run_async_command(command: Commands, config: Config) -> Result<()> {
    let connector = DockerConnector::from_config(&config)
        .with_context(|| format!("Failed to set up Docker endpoint {}", config.docker_endpoint))?;

    match command {
        Commands::Run => {
            let cleaner = build_cleaner(&connector, &config)?;
            let cancellation_token = CancellationToken::new();

            let signal_token = cancellation_token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("received Ctrl-C, shutting down");
                }
                signal_token.cancel();
            });

            CleanupDaemon::new(cleaner, config.cleanup_period())
                .run(cancellation_token)
                .await
        }
        Commands::Clean => {
            let report = build_cleaner(&connector, &config)?.run_once().await;
            println!("{report}");
            for error in &report.errors {
                println!("  {error}");
            }
            match report.listing_error {
                Some(error) => anyhow::bail!("cleanup pass aborted: {error}"),
                None => Ok(()),
            }
        }
        Commands::Ps => {
            let containers = connector
                .list_containers()
                .await
                .context("Failed to list containers")?;

            println!(
                "{:<14} {:<10} {:<20} {:<40} MACHINE",
                "ID", "STATE", "CREATED", "NAME"
            );
            for container in containers {
                let name = container.first_name().unwrap_or("");
                let machine = naming::decode(name)
                    .map(|identity| identity.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let state = if container.is_running() { "running" } else { "stopped" };
                let created = container
                    .created_at()
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let short_id: String = container.id.chars().take(12).collect();
                println!("{short_id:<14} {state:<10} {created:<20} {name:<40} {machine}");
            }
            Ok(())
        }
        Commands::Info => {
            let version = connector
                .version()
                .await
                .context("Failed to get Docker version")?;
            let info = connector
                .system_info()
                .await
                .context("Failed to get Docker system info")?;

            println!("Server version:  {}", version.version);
            println!("API version:     {}", version.api_version);
            println!("Go version:      {}", version.go_version);
            println!("OS/Arch:         {}/{}", version.os, version.arch);
            println!("Kernel:          {}", version.kernel_version);
            println!("Host name:       {}", info.name);
            println!("Storage driver:  {}", info.driver);
            println!(
                "Containers:      {} ({} running, {} paused, {} stopped)",
                info.containers,
                info.containers_running,
                info.containers_paused,
                info.containers_stopped
            );
            println!("Images:          {}", info.images);
            println!("CPUs:            {}", info.ncpu);
            println!("Memory:          {} bytes", info.mem_total);
            Ok(())
        }
        Commands::Name(command) => process_name_command(&command),
    }
}
