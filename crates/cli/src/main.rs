//! buildwatch CLI - CI status aggregation and blame attribution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use buildwatch_backend::{Backend, MemoryBackend};
use buildwatch_core::{Feature, Status, TargetDetail, TargetId};
use buildwatch_directory::KnownOffenders;
use buildwatch_engine::{EngineConfig, StatusResolver, TargetCatalog};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildwatch")]
#[command(about = "Aggregate CI status and find who broke the build", long_about = None)]
struct Cli {
    /// Backend fixture (JSON); repeat for several backends
    #[arg(long = "fixture", required = true)]
    fixtures: Vec<PathBuf>,

    /// Known offenders (JSON array)
    #[arg(long)]
    offenders: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the per-call backend timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every target of a feature
    Status {
        /// Feature (project/view) name; empty for everything
        #[arg(long, default_value = "")]
        feature: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the target ids of a feature
    Targets {
        /// Feature (project/view) name; empty for everything
        #[arg(long, default_value = "")]
        feature: String,
    },
    /// Leave a note on a broken target
    Annotate {
        /// Target id as printed by `targets`
        target: String,
        /// The note
        note: String,
        /// Feature the target belongs to
        #[arg(long, default_value = "")]
        feature: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli).await?;
    let catalogs = open_catalogs(&cli, &config).await?;

    match cli.command {
        Commands::Status { feature, json } => {
            let mut resolved = Vec::new();
            for (endpoint, catalog) in &catalogs {
                catalog.register(&Feature::new(feature.clone(), endpoint.clone())).await;
                resolved.extend(catalog.resolve_all().await);
            }

            if json {
                let details: Vec<_> = resolved.iter().map(|(_, d)| d).collect();
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("Targets ({})", resolved.len());
                for (_, detail) in &resolved {
                    println!("  {}", format_detail(detail));
                }
            }
        }
        Commands::Targets { feature } => {
            for (endpoint, catalog) in &catalogs {
                let ids = catalog.register(&Feature::new(feature.clone(), endpoint.clone())).await;
                println!("{} ({})", endpoint, ids.len());
                for id in ids {
                    println!("  {}", id);
                }
            }
        }
        Commands::Annotate { target, note, feature } => {
            let id: TargetId = target.parse()?;
            let mut outcome = None;
            for (endpoint, catalog) in &catalogs {
                catalog.register(&Feature::new(feature.clone(), endpoint.clone())).await;
                match catalog.annotate(&id, &note).await {
                    Ok(posted) => {
                        outcome = Some(posted);
                        break;
                    }
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            match outcome {
                Some(posted) => println!("{}", format_annotation(&id, posted)),
                None => anyhow::bail!("unknown target: {}", id),
            }
        }
    }

    Ok(())
}

async fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json(&contents)
                .with_context(|| format!("invalid config at {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(ms) = cli.timeout_ms {
        config = config.with_call_timeout(Duration::from_millis(ms));
    }
    debug!("Using {:?}", config);
    Ok(config)
}

async fn open_catalogs(cli: &Cli, config: &EngineConfig) -> Result<Vec<(String, TargetCatalog)>> {
    let directory = match &cli.offenders {
        Some(path) => KnownOffenders::load(path)
            .await
            .with_context(|| format!("failed to load offenders from {}", path.display()))?,
        None => KnownOffenders::new(Vec::new())?,
    };
    let directory = Arc::new(directory);

    let mut catalogs = Vec::new();
    for path in &cli.fixtures {
        let backend = MemoryBackend::load(path)
            .await
            .with_context(|| format!("failed to load fixture {}", path.display()))?;
        let endpoint = backend.endpoint().to_string();
        info!("Watching {}", endpoint);

        let resolver = StatusResolver::new(Arc::new(backend), directory.clone())
            .with_config(config.clone());
        catalogs.push((endpoint, TargetCatalog::new(resolver)));
    }
    Ok(catalogs)
}

fn format_detail(detail: &TargetDetail) -> String {
    let mut line = format!("{:<24} {}", detail.display_name, format_status(detail.status));
    for build in &detail.running_builds {
        line.push_str(&format!(" [{} {}]", format_status(build.status), build.completion));
    }
    if !detail.sponsors.is_empty() {
        let names: Vec<_> = detail.sponsors.iter().map(|s| s.identity.as_str()).collect();
        line.push_str(&format!(" <- {}", names.join(", ")));
    }
    line
}

fn format_annotation(id: &TargetId, posted: bool) -> String {
    if posted {
        format!("Noted on {}", id)
    } else {
        format!(
            "Nothing noted on {}: no broken build, or the backend refused the comment (see log)",
            id
        )
    }
}

fn format_status(status: Status) -> &'static str {
    match status {
        Status::Unknown => "UNKNOWN",
        Status::Green => "GREEN",
        Status::Broken => "BROKEN",
        Status::Disabled => "DISABLED",
        Status::UnderInvestigation => "INVESTIGATING",
    }
}
