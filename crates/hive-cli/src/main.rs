//! Hive - keeps MCP clients pointed at running MCP server containers
//!
//! Usage:
//!   hive sync [client]                     # Sync running servers into client configs
//!   hive config register-client <client>   # Register a client and sync it
//!   hive config set-registry-url <url>     # Settings management

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hive_core::client::ClientType;
use hive_core::commands::{ClientsCommand, RegisterReport, RemoveReport, SettingsCommand};
use hive_core::context::AppContext;
use hive_core::runtime::DockerCliRuntime;
use hive_core::sync::{SyncReport, UpsertOutcome};

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Sync running MCP servers into client configurations", long_about = None)]
struct Cli {
    /// Cancel the operation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync running MCP servers into registered client configs
    Sync {
        /// Client to sync (all registered clients when omitted)
        client: Option<ClientType>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Manage hive settings and registered clients
    Config(ConfigArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Register a client and sync running servers into it
    RegisterClient {
        client: ClientType,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Stop syncing a client (its config files are left as they are)
    RemoveClient { client: ClientType },

    /// List registered clients
    ListRegisteredClients,

    /// Use a custom CA certificate (PEM)
    SetCaCert { path: PathBuf },

    /// Show the configured CA certificate
    GetCaCert,

    /// Remove the CA certificate setting
    UnsetCaCert,

    /// Use a remote MCP server registry
    SetRegistryUrl {
        url: String,

        /// Allow a registry host that is a private IP address
        #[arg(long)]
        allow_private_ip: bool,
    },

    /// Show the configured registry URL
    GetRegistryUrl,

    /// Remove the registry URL setting
    UnsetRegistryUrl,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hive=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cancel = cancellation(cli.timeout);
    let ctx = AppContext::from_env()?;
    tracing::debug!(
        config_dir = %ctx.config_dir().display(),
        state_dir = %ctx.state_dir().display(),
        "Resolved hive directories"
    );

    match cli.command {
        Commands::Sync { client, format } => run_sync(ctx, client, format, &cancel).await,
        Commands::Config(args) => run_config(ctx, args.command, &cancel).await,
    }
}

/// Token fired by Ctrl-C or by the global `--timeout`.
fn cancellation(timeout: Option<u64>) -> CancellationToken {
    let cancel = CancellationToken::new();

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, cancelling...");
            on_signal.cancel();
        }
    });

    if let Some(secs) = timeout {
        let on_timeout = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            on_timeout.cancel();
        });
    }

    cancel
}

fn clients_command(ctx: AppContext) -> ClientsCommand {
    ClientsCommand::new(ctx, Arc::new(DockerCliRuntime::from_env()))
}

async fn run_sync(
    ctx: AppContext,
    client: Option<ClientType>,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let reports = clients_command(ctx).sync(client, cancel).await?;

    match format {
        OutputFormat::Table => {
            if reports.is_empty() {
                println!("No clients registered.");
                println!("Register one with: hive config register-client <client>");
            }
            for report in &reports {
                print_sync_report(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

async fn run_config(
    ctx: AppContext,
    command: ConfigSubcommand,
    cancel: &CancellationToken,
) -> Result<()> {
    let settings = SettingsCommand::new(ctx.settings_store());

    match command {
        ConfigSubcommand::RegisterClient { client, format } => {
            let report = clients_command(ctx).register(client, cancel).await?;
            match format {
                OutputFormat::Table => print_register_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        ConfigSubcommand::RemoveClient { client } => {
            let report = clients_command(ctx).remove(client, cancel).await?;
            print_remove_report(&report);
        }
        ConfigSubcommand::ListRegisteredClients => {
            let clients = clients_command(ctx).list()?;
            if clients.is_empty() {
                println!("No clients are currently registered.");
            } else {
                println!("Registered clients:");
                for client in clients {
                    println!("  - {:<20} {}", client.id(), client.description());
                }
            }
        }
        ConfigSubcommand::SetCaCert { path } => {
            let stored = settings.set_ca_cert(&path, cancel).await?;
            println!("✓ CA certificate set to {}", stored.display());
        }
        ConfigSubcommand::GetCaCert => match settings.get_ca_cert()? {
            Some(status) => {
                println!("CA certificate: {}", status.path.display());
                if !status.accessible {
                    println!("  ⚠ file is no longer accessible");
                }
            }
            None => println!("No CA certificate is configured."),
        },
        ConfigSubcommand::UnsetCaCert => {
            if settings.unset_ca_cert(cancel).await? {
                println!("✓ CA certificate setting removed");
            } else {
                println!("No CA certificate is configured.");
            }
        }
        ConfigSubcommand::SetRegistryUrl {
            url,
            allow_private_ip,
        } => {
            let stored = settings
                .set_registry_url(&url, allow_private_ip, cancel)
                .await?;
            println!("✓ Registry URL set to {stored}");
            if allow_private_ip {
                println!("  ⚠ private IP addresses are allowed for this registry");
            }
        }
        ConfigSubcommand::GetRegistryUrl => match settings.get_registry_url()? {
            Some(setting) => {
                println!("Registry URL: {}", setting.url);
                if setting.allow_private_ip {
                    println!("  private IP addresses allowed");
                }
            }
            None => println!("No registry URL is configured."),
        },
        ConfigSubcommand::UnsetRegistryUrl => {
            if settings.unset_registry_url(cancel).await? {
                println!("✓ Registry URL setting removed");
            } else {
                println!("No registry URL is configured.");
            }
        }
    }
    Ok(())
}

fn print_register_report(report: &RegisterReport) {
    if report.newly_registered {
        println!("✓ Registered client '{}'", report.client);
    } else {
        println!("• Client '{}' is already registered", report.client);
    }
    if let Some(sync) = &report.sync {
        print_sync_report(sync);
    }
    if let Some(error) = &report.sync_error {
        println!("  ⚠ could not sync running servers: {error}");
    }
}

fn print_remove_report(report: &RemoveReport) {
    if report.removed {
        println!("✓ Removed client '{}'", report.client);
    } else {
        println!("• Client '{}' was not registered", report.client);
    }
}

fn print_sync_report(report: &SyncReport) {
    println!("Client: {}", report.client);
    if report.is_empty() {
        println!("  Nothing to sync.");
    } else {
        println!("  {:<20} {:<16} Config file", "Server", "Result");
        println!("  {}", "-".repeat(68));
        for entry in &report.entries {
            println!(
                "  {:<20} {:<16} {}",
                entry.server,
                entry.outcome.label(),
                entry.path.display()
            );
            if let UpsertOutcome::Failed { reason } = &entry.outcome {
                println!("  {:<20} ⚠ {}", "", reason);
            }
        }
    }
    for skipped in &report.skipped {
        println!("  • skipped {}: {}", skipped.workload, skipped.reason);
    }
}
