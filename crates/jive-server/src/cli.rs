//! The `jive` command line (SPEC_FULL §10.5): `serve` starts the MCP
//! server over stdio or streamable HTTP; `sync` and `validate` run one-shot
//! maintenance operations against the same [`jive_infrastructure::Core`]
//! without standing up a transport.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use jive_domain::error::{Error, Result};
use jive_domain::ports::MergeStrategy;
use jive_domain::value_objects::WorkItemId;
use jive_infrastructure::config::ConfigLoader;
use jive_infrastructure::{logging, Core};

use crate::server::JiveMcpServer;
use crate::transport;

#[derive(Debug, Parser)]
#[command(name = "jive", version, about = "Hierarchical work-item orchestration engine for autonomous agents")]
pub struct Cli {
    /// Path to a `jive.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransportArg {
    Stdio,
    Http,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the MCP server.
    Serve {
        /// Transport to serve over.
        #[arg(long, value_enum, default_value = "stdio")]
        transport: TransportArg,
        /// Bind address for `--transport http`; overrides the config file.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Reconcile an on-disk work-item file into the store.
    Sync {
        /// Path to the work-item file (`.json` or `.yaml`).
        path: PathBuf,
        /// Conflict resolution strategy when the file and store disagree.
        #[arg(long, value_enum, default_value = "auto-merge")]
        merge_strategy: MergeStrategyArg,
    },
    /// Validate the dependency graph across every stored work item.
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MergeStrategyArg {
    FileWins,
    DatabaseWins,
    AutoMerge,
    ManualResolution,
}

impl From<MergeStrategyArg> for MergeStrategy {
    fn from(value: MergeStrategyArg) -> Self {
        match value {
            MergeStrategyArg::FileWins => Self::FileWins,
            MergeStrategyArg::DatabaseWins => Self::DatabaseWins,
            MergeStrategyArg::AutoMerge => Self::AutoMerge,
            MergeStrategyArg::ManualResolution => Self::ManualResolution,
        }
    }
}

/// Parse `argv`, load configuration, and dispatch to the selected command.
///
/// # Errors
///
/// Propagates configuration, bootstrap, and transport failures.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;
    logging::init_logging(&config)?;

    let core = Arc::new(Core::bootstrap(&config).await?);

    match cli.command {
        Command::Serve { transport: transport_arg, bind } => {
            let server = JiveMcpServer::new(core);
            match transport_arg {
                TransportArg::Stdio => transport::serve_stdio(server).await,
                TransportArg::Http => {
                    let addr = bind
                        .or_else(|| config.bind_addr.parse().ok())
                        .ok_or_else(|| Error::config(format!("invalid bind_addr: {:?}", config.bind_addr)))?;
                    transport::serve_http(server, addr).await
                }
            }
        }
        Command::Sync { path, merge_strategy } => run_sync(&core, &path, merge_strategy.into()).await,
        Command::Validate => run_validate(&core).await,
    }
}

async fn run_sync(core: &Core, path: &PathBuf, merge_strategy: MergeStrategy) -> Result<()> {
    let content = std::fs::read(path)?;
    let path_str = path.to_string_lossy().into_owned();
    let outcome = core.sync_engine.sync_file_to_store(&path_str, &content, merge_strategy, false).await?;
    match outcome {
        jive_application::SyncOutcome::Success(item) => {
            println!("synced {} ({})", item.id, item.title);
        }
        jive_application::SyncOutcome::Conflict(conflict) => {
            eprintln!("conflict syncing {path_str}: {} field(s) disagree", conflict.fields.len());
            for field in &conflict.fields {
                eprintln!("  {}: file={:?} store={:?}", field.field, field.file_value, field.store_value);
            }
            return Err(Error::conflict(format!("unresolved sync conflict for {path_str}")));
        }
    }
    Ok(())
}

async fn run_validate(core: &Core) -> Result<()> {
    let records = core.store.list(jive_domain::ports::Table::WorkItem, Default::default()).await?;
    let ids: Vec<WorkItemId> = records
        .iter()
        .filter_map(|record| record.get("id").and_then(serde_json::Value::as_str))
        .filter_map(|raw| raw.parse().ok())
        .collect();

    let report = core.dependency_engine.validate(&ids, true, true, true).await?;
    println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    if report.is_valid {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{} cycle(s), {} missing edge(s)",
            report.cycles.len(),
            report.missing.len()
        )))
    }
}
