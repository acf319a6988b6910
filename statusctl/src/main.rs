//! statusctl - terminal client for the status page API.
//!
//! Reads `STATUS_*` environment variables; flags override them.

mod commands;
mod render;
mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Context;
use status_core::model::{IncidentKind, IncidentStatus, ServiceStatus};
use status_core::ClientConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "statusctl")]
#[command(author, version, about = "Manage services and incidents on a status page")]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// API base URL (default: $STATUS_API_BASE_URL or http://localhost:8080)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Organization to act for (default: $STATUS_ORG_ID)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Bearer token for the organization (default: $STATUS_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List services
    Services,

    /// Create, edit or delete a service
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },

    /// Show a service's uptime and status history
    Uptime {
        /// Service id
        id: String,

        /// Window: 1d, 7d or 30d
        #[arg(short, long, default_value = "7d")]
        period: String,
    },

    /// List incidents and maintenance
    Incidents,

    /// Create, edit, resolve or annotate an incident
    Incident {
        #[command(subcommand)]
        action: IncidentAction,
    },

    /// Show the public status page
    Status,

    /// Follow live updates and re-render on every change
    Watch,
}

#[derive(Subcommand)]
enum ServiceAction {
    /// Create a service
    Add {
        name: String,

        /// Operational, Degraded Performance, Partial Outage or Major Outage
        #[arg(short, long, default_value = "Operational")]
        status: ServiceStatus,
    },

    /// Change a service's name or status
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        status: Option<ServiceStatus>,
    },

    /// Delete a service
    Delete { id: String },
}

#[derive(Subcommand)]
enum IncidentAction {
    /// Report an incident or schedule maintenance
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// incident or maintenance
        #[arg(long = "type", default_value = "incident")]
        kind: IncidentKind,

        #[arg(short, long)]
        status: Option<IncidentStatus>,

        /// Affected service id (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Edit an incident's fields
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long = "type")]
        kind: Option<IncidentKind>,

        #[arg(short, long)]
        status: Option<IncidentStatus>,

        /// Toggle an affected service id (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Mark an incident resolved or maintenance completed
    Resolve { id: String },

    /// Append a timeline update
    Update {
        id: String,

        #[arg(short, long)]
        message: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,statusctl=info,status_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.base_url {
        config.api_base_url = url.clone();
    }
    if let Some(org) = &cli.org {
        config.organization_id = Some(org.clone());
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    config
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli);
    let ctx = Context::new(&config, cli.json)?;

    match cli.command {
        Commands::Services => commands::list_services(&ctx).await,
        Commands::Service { action } => match action {
            ServiceAction::Add { name, status } => commands::add_service(&ctx, name, status).await,
            ServiceAction::Edit { id, name, status } => {
                commands::edit_service(&ctx, &id, name, status).await
            }
            ServiceAction::Delete { id } => commands::delete_service(&ctx, &id).await,
        },
        Commands::Uptime { id, period } => commands::uptime(&ctx, &id, &period).await,
        Commands::Incidents => commands::list_incidents(&ctx).await,
        Commands::Incident { action } => match action {
            IncidentAction::Add {
                title,
                description,
                kind,
                status,
                services,
            } => {
                let draft = commands::IncidentDraft {
                    title: Some(title),
                    description: Some(description),
                    kind: Some(kind),
                    status,
                    services,
                };
                commands::add_incident(&ctx, draft).await
            }
            IncidentAction::Edit {
                id,
                title,
                description,
                kind,
                status,
                services,
            } => {
                let draft = commands::IncidentDraft {
                    title,
                    description,
                    kind,
                    status,
                    services,
                };
                commands::edit_incident(&ctx, &id, draft).await
            }
            IncidentAction::Resolve { id } => commands::resolve_incident(&ctx, &id).await,
            IncidentAction::Update { id, message } => {
                commands::add_update(&ctx, &id, message).await
            }
        },
        Commands::Status => commands::public_status(&ctx).await,
        Commands::Watch => watch::run(&ctx).await,
    }
}
