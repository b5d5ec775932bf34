//! # SQL Version Control CLI
//!
//! Renders or validates the workflow definition, and exposes the two
//! notification hooks for schedulers that call out to a process.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing::error;

use sql_version_control::config::ConfigLoader;
use sql_version_control::logging::init_structured_logging;
use sql_version_control::notifications::{DispatchOutcome, ExecutionContext, Notifier};
use sql_version_control::registry::{ConnectionRegistry, InMemoryConnectionRegistry};
use sql_version_control::workflow::{build_workflow, WorkflowDefinition};
use sql_version_control::WorkflowConfig;

#[derive(Parser)]
#[command(name = "sql-vc")]
#[command(about = "Render, validate and notify for the SQL version control workflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use these connection ids instead of querying the registry database
    #[arg(long, global = true, value_delimiter = ',')]
    dry_run_connections: Option<Vec<String>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the definition and print it
    Render {
        #[arg(long, value_enum, default_value_t = RenderFormat::Json)]
        format: RenderFormat,
    },

    /// Build the definition and print a one-line summary
    Validate,

    /// Run a notification hook for an execution context read as JSON
    Notify {
        #[arg(value_enum)]
        hook: Hook,

        /// Context file; `-` reads stdin
        #[arg(long, default_value = "-")]
        context: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderFormat {
    Json,
    Dot,
}

#[derive(Clone, Copy, ValueEnum)]
enum Hook {
    Success,
    Failure,
}

#[tokio::main]
async fn main() {
    init_structured_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "sql-vc failed");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("loading configuration")?;

    match cli.command {
        Commands::Render { format } => {
            let definition = build(&config, cli.dry_run_connections).await?;
            match format {
                RenderFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&definition)?);
                }
                RenderFormat::Dot => print!("{}", definition.graph.to_dot(&definition.dag_id)),
            }
        }
        Commands::Validate => {
            let definition = build(&config, cli.dry_run_connections).await?;
            println!("{}", definition.summary());
        }
        Commands::Notify { hook, context } => {
            let ctx = read_context(&context)?;
            let notifier = Notifier::from_config(&config.notifications)?;
            let outcome = match hook {
                Hook::Success => notifier.on_success(&ctx).await,
                Hook::Failure => notifier.on_failure(&ctx).await,
            };
            // Dispatch is best-effort; report but do not fail the caller
            if let DispatchOutcome::Failed(reason) = outcome {
                eprintln!("notification not delivered: {reason}");
            }
        }
    }

    Ok(())
}

async fn build(
    config: &WorkflowConfig,
    dry_run_connections: Option<Vec<String>>,
) -> anyhow::Result<WorkflowDefinition> {
    let registry: Box<dyn ConnectionRegistry> = match dry_run_connections {
        Some(ids) => Box::new(InMemoryConnectionRegistry::new(ids)),
        None => postgres_registry(config).await?,
    };
    Ok(build_workflow(config, registry.as_ref()).await?)
}

#[cfg(feature = "postgres")]
async fn postgres_registry(config: &WorkflowConfig) -> anyhow::Result<Box<dyn ConnectionRegistry>> {
    let registry = sql_version_control::registry::PgConnectionRegistry::connect(&config.registry)
        .await
        .context("connecting to the connection registry")?;
    Ok(Box::new(registry))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_registry(_config: &WorkflowConfig) -> anyhow::Result<Box<dyn ConnectionRegistry>> {
    bail!("built without the `postgres` feature; pass --dry-run-connections")
}

fn read_context(source: &str) -> anyhow::Result<ExecutionContext> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };
    if raw.trim().is_empty() {
        bail!("empty execution context");
    }
    serde_json::from_str(&raw).context("parsing execution context")
}
