use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quorum_core::{DesiredState, MigrationStage, QuorumSynthesizer, TokioConfigStore};

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Render and apply coordination-service node configuration", long_about = None)]
struct Cli {
    /// Desired-state file (TOML, JSON or YAML)
    #[arg(long, short, default_value = "quorum.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the assembled properties
    Properties {
        /// Drop the keys owned by dynamic reconfiguration
        #[arg(long = "static")]
        static_only: bool,
    },
    /// Print the JAAS login-module config
    Jaas,
    /// Write every artifact for this node
    Apply {
        /// Server connection strings for the dynamic file
        #[arg(long)]
        servers: Option<String>,
    },
    /// Print the rolling-restart stages between two quorum modes
    Stages {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

fn parse_mode(mode: &str) -> anyhow::Result<bool> {
    match mode {
        "plaintext" => Ok(false),
        "tls" => Ok(true),
        other => bail!("unknown quorum mode '{}', expected plaintext or tls", other),
    }
}

async fn load(config: &Path) -> anyhow::Result<(DesiredState, QuorumSynthesizer)> {
    let desired = DesiredState::load(config)
        .await
        .with_context(|| format!("failed to load {:?}", config))?;
    let synth = QuorumSynthesizer::new(Arc::new(TokioConfigStore::new()), desired.paths());
    Ok((desired, synth))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("quorum=info".parse().context("invalid log directive")?)
        .add_directive("quorum_core=info".parse().context("invalid log directive")?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stages { from, to } => {
            let stages = MigrationStage::plan(parse_mode(&from)?, parse_mode(&to)?);
            if stages.is_empty() {
                println!("already {}", to);
            }
            for (index, stage) in stages.iter().enumerate() {
                let flags = stage.flags().lines();
                println!("{}. {} -> [{}]", index + 1, stage, flags.join(", "));
            }
        }
        Commands::Properties { static_only } => {
            let (desired, synth) = load(&cli.config).await?;
            let props = if static_only {
                synth.static_properties(&desired).await?
            } else {
                synth.properties(&desired).await?
            };
            println!("{}", props);
        }
        Commands::Jaas => {
            let (desired, _) = load(&cli.config).await?;
            print!("{}", quorum_core::generate_auth(&desired.credentials, &desired.clients)?);
        }
        Commands::Apply { servers } => {
            let (desired, synth) = load(&cli.config).await?;
            let report = synth.reconcile(&desired, servers.as_deref()).await?;
            tracing::info!(
                "Node {} reconciled (dynamic pointer: {:?})",
                report.identity,
                report.pointer_source
            );
            if report.restart_required {
                println!("restart required: {}", quorum_core::launch::start_command(synth.paths()));
            } else {
                println!("static configuration unchanged");
            }
        }
    }

    Ok(())
}
