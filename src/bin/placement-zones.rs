// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement Zone Command Line Interface
//!
//! Lists, creates, edits and removes placement zones on the control plane.
//!
//! Run with: cargo run --bin placement-zones --features cli -- ls
//!
//! # Usage
//!
//! ```bash
//! export CONTROL_PLANE_URL=https://cp.example.com:8282
//! export CONTROL_PLANE_TOKEN=...
//!
//! placement-zones ls
//! placement-zones add zone1 --cp owner=ops --tag env:prod
//! placement-zones edit zone1 --name zone-one --add-tag team:infra --remove-tag env:prod
//! placement-zones rm --id 5f2a
//! ```
//!
//! Exit status is 0 on success, 1 when the command was rejected and 2 when the
//! server returned data that could not be understood.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

use cim_placement::{
    transport::HttpTransport, ControlPlaneConfig, PlacementError, PlacementZoneDirectory,
    ZoneEdit, ZoneRef,
};

#[derive(Parser)]
#[command(name = "placement-zones")]
#[command(about = "Manage placement zones and their tag policies")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control plane base URL
    #[arg(long, global = true, env = "CONTROL_PLANE_URL")]
    url: Option<String>,
}

/// A zone named by its unique name or by ID
#[derive(Args)]
struct Target {
    /// Placement zone name
    #[arg(required_unless_present = "id", conflicts_with = "id")]
    name: Option<String>,

    /// Placement zone ID (may be shortened)
    #[arg(long)]
    id: Option<String>,
}

impl Target {
    fn zone_ref(self) -> ZoneRef {
        match (self.id, self.name) {
            (Some(id), _) => ZoneRef::Id(id),
            (None, Some(name)) => ZoneRef::Name(name),
            // clap enforces one of the two
            (None, None) => ZoneRef::Name(String::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List placement zones
    Ls,

    /// Create a placement zone
    Add {
        /// Placement zone name
        name: String,

        /// Custom property in key=value form
        #[arg(long = "cp")]
        custom_properties: Vec<String>,

        /// Tag to match, in key:value form
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Rename a placement zone or change its tags
    Edit {
        #[command(flatten)]
        target: Target,

        /// New name
        #[arg(long = "name")]
        new_name: Option<String>,

        /// Tag to add, in key:value form
        #[arg(long = "add-tag")]
        tags_to_add: Vec<String>,

        /// Tag to remove, in key:value form
        #[arg(long = "remove-tag")]
        tags_to_remove: Vec<String>,
    },

    /// Remove a placement zone
    Rm {
        #[command(flatten)]
        target: Target,
    },
}

async fn run(cli: Cli) -> Result<String, PlacementError> {
    let config = ControlPlaneConfig::from_env_with_url(cli.url.as_deref())?;
    debug!("Using control plane at {}", config.base_url);

    let transport = Arc::new(HttpTransport::new(config)?);
    let mut directory = PlacementZoneDirectory::with_listing_resolver(transport);

    match cli.command {
        Commands::Ls => {
            directory.list().await?;
            directory.render().await
        }
        Commands::Add {
            name,
            custom_properties,
            tags,
        } => {
            let id = directory.add(&name, &custom_properties, &tags).await?;
            Ok(format!("Placement zone added: {}", id))
        }
        Commands::Edit {
            target,
            new_name,
            tags_to_add,
            tags_to_remove,
        } => {
            let changes = ZoneEdit {
                new_name: new_name.unwrap_or_default(),
                tags_to_add,
                tags_to_remove,
            };
            let id = directory.edit(&target.zone_ref(), &changes).await?;
            Ok(format!("Placement zone updated: {}", id))
        }
        Commands::Rm { target } => {
            let id = directory.remove(&target.zone_ref()).await?;
            Ok(format!("Placement zone removed: {}", id))
        }
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
                .context("Invalid RUST_LOG filter")?,
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("{:#}", e);
    }

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            error!("Unrecoverable response from control plane: {}", e);
            eprintln!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("{}", e);
            if matches!(
                e,
                PlacementError::NotFound { .. } | PlacementError::Ambiguous { .. }
            ) {
                eprintln!("Use --id to select a placement zone by ID.");
            }
            ExitCode::from(1)
        }
    }
}
