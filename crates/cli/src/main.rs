//! kubectl-vpa
//!
//! A command-line tool that compares the resource requests of running
//! pods against VerticalPodAutoscaler recommendations, changes VPA
//! update modes, and generates VPA manifests and resource suggestions.

mod client;
mod commands;
mod output;
mod vpa;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vpa_core::models::Mode;

use client::ClusterClient;
use output::OutputFormat;

/// Compare pod resource requests against VPA recommendations
#[derive(Parser)]
#[command(name = "kubectl-vpa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Namespace to work in
    #[arg(long, short = 'n', global = true, default_value = "default")]
    pub namespace: String,

    /// List the requested object(s) across all namespaces
    #[arg(long, short = 'A', global = true)]
    pub all_namespaces: bool,

    /// Path to kubeconfig file (uses default resolution if not specified)
    #[arg(long, global = true, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare pod requests to VPA recommendations
    Compare(CompareArgs),

    /// Change the update mode on VPA resource(s)
    Mode(ModeArgs),

    /// Suggest a resources snippet from a VPA's recommendation
    Suggest(SuggestArgs),

    /// Create a VPA manifest for existing workload(s)
    Create(CreateArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// All pods, even those without a VPA
    #[arg(short = 'l', long = "all-pods")]
    pub all_pods: bool,

    /// Filter only VPAs with the specified mode(s)
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub modes: Vec<Mode>,

    /// Invert the mode filter
    #[arg(short = 'i', long)]
    pub invert: bool,

    /// Show in brief format (namespace/vpa-name lines)
    #[arg(short = 'b', long)]
    pub brief: bool,

    /// Only print the first N rows
    #[arg(short = 'H', long, value_name = "N")]
    pub head: Option<usize>,

    /// Only print the last N rows
    #[arg(short = 't', long, value_name = "N")]
    pub tail: Option<usize>,

    /// Sort by column N, 1-based (negative sorts descending)
    #[arg(
        short = 's',
        long = "sort",
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub sort: Vec<i32>,

    /// Add sums to the value columns
    #[arg(short = 'z', long)]
    pub sum: bool,
}

#[derive(Args)]
pub struct ModeArgs {
    /// Mode to set: Off, Initial or Auto
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Mode,

    /// VPA resource name(s), optionally namespace/name
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Name of the VPA resource, optionally namespace/name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output format
    #[arg(short = 'o', long = "output-format", default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Workload or pod name(s) to create a VPA for
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Update mode to assign in the output
    #[arg(short = 'm', long, default_value = "off", value_name = "MODE")]
    pub mode: Mode,

    /// Output format
    #[arg(short = 'o', long = "output-format", default_value = "yaml")]
    pub format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let namespace = if cli.all_namespaces {
        None
    } else {
        Some(cli.namespace.clone())
    };

    let client = ClusterClient::connect(cli.kubeconfig.as_deref(), namespace)
        .await
        .context("kubernetes connection failed")?;

    match &cli.command {
        Commands::Compare(args) => commands::compare::run(&client, args).await,
        Commands::Mode(args) => {
            commands::mode::run(&client, &cli.namespace, args.mode, &args.names).await
        }
        Commands::Suggest(args) => {
            commands::suggest::run(&client, &cli.namespace, &args.name, args.format).await
        }
        Commands::Create(args) => {
            commands::create::run(&client, &cli.namespace, &args.names, args.mode, args.format)
                .await
        }
    }
}
