//! # SQS Queue CLI
//!
//! Command-line interface for adding, counting and purging messages on an
//! SQS queue through the `sqs-queue` adapter.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. `sqs-queue.{yaml,toml,json}` in the working directory (optional)
//! 2. The file given with `--config` (required when given)
//! 3. Environment variables prefixed `SQS_QUEUE__`, with `__` separating
//!    nested keys (e.g. `SQS_QUEUE__SQS__REGION=eu-west-1`)
//!
//! The `--queue` flag (or `SQS_QUEUE_URL`) overrides the configured queue.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqs_queue::{
    BackendError, ConfigurationError, HttpSqsBackend, Queue, QueueError, QueueIdentifier,
    SqsConfig, SqsQueue,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Structure
// ============================================================================

/// SQS Queue CLI - add, count and purge queue messages
#[derive(Debug, Parser)]
#[command(name = "sqs-queue")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Add, count and purge messages on an SQS queue")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SQS_QUEUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Queue URL, overriding the configured queue
    #[arg(short, long, global = true, env = "SQS_QUEUE_URL")]
    pub queue: Option<String>,

    /// Logging level, used when RUST_LOG is not set
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Send a message; the body is sent verbatim
    Add {
        /// Message body
        body: String,
    },

    /// Print the approximate number of pending messages
    Count,

    /// Purge every message from the queue
    Clear {
        /// Confirm the purge
        #[arg(short, long)]
        yes: bool,
    },

    /// Look up a queue URL by queue name
    Resolve {
        /// Queue name
        name: String,
    },
}

// ============================================================================
// Configuration
// ============================================================================

/// Settings loaded from files and environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Queue URL the commands target
    pub queue: Option<String>,

    /// Backend connection settings
    pub sqs: SqsConfig,
}

// ============================================================================
// Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Queue operation failed: {0}")]
    Queue(#[from] QueueError),

    #[error("Backend request failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::ConfigLoad(_) => 1,
            Self::Queue(_) => 2,
            Self::Backend(_) => 3,
            Self::InvalidArgument { .. } => 4,
            Self::Logging { .. } => 5,
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Parse arguments, initialize logging and run the requested command
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;
    run(cli).await
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.command == (Commands::Clear { yes: false }) {
        return Err(CliError::InvalidArgument {
            argument: "--yes".to_string(),
            message: "purging drops every message in the queue; pass --yes to confirm"
                .to_string(),
        });
    }

    let config = load_configuration(cli.config.as_deref())?;
    debug!(sqs = ?config.sqs, "Configuration loaded");

    let backend = Arc::new(HttpSqsBackend::new(&config.sqs)?);
    let target = || {
        queue_identifier(cli.queue.clone(), config.queue.clone())
            .map(|queue| SqsQueue::new(Arc::clone(&backend), queue))
    };

    let output = match &cli.command {
        Commands::Add { body } => {
            add_message(&target()?, body).await?;
            None
        }
        Commands::Count => Some(target()?.count().await?.to_string()),
        Commands::Clear { .. } => {
            clear_queue(&target()?).await?;
            None
        }
        Commands::Resolve { name } => Some(backend.resolve_queue_url(name).await?.to_string()),
    };

    if let Some(output) = output {
        println!("{}", output);
    }

    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Initialize logging based on CLI arguments
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if cli.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

/// Load configuration from the default file, an explicit file and environment
fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, CliError> {
    let mut builder =
        config::Config::builder().add_source(config::File::with_name("sqs-queue").required(false));

    if let Some(path) = config_path {
        info!(path = %path.display(), "Loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: CliConfig = builder
        .add_source(config::Environment::with_prefix("SQS_QUEUE").separator("__"))
        .build()?
        .try_deserialize()?;

    config.sqs.validate()?;
    Ok(config)
}

/// Pick the queue from the command line, falling back to configuration
fn queue_identifier(
    from_flag: Option<String>,
    from_config: Option<String>,
) -> Result<QueueIdentifier, CliError> {
    let queue = from_flag
        .or(from_config)
        .ok_or_else(|| ConfigurationError::Missing {
            key: "queue".to_string(),
        })?;

    QueueIdentifier::new(queue).map_err(|e| CliError::InvalidArgument {
        argument: "queue".to_string(),
        message: e.to_string(),
    })
}

/// Send `body` verbatim
async fn add_message(queue: &dyn Queue, body: &str) -> Result<(), CliError> {
    queue.add(&body).await?;
    info!("Message sent");
    Ok(())
}

/// Purge every message from the queue
async fn clear_queue(queue: &dyn Queue) -> Result<(), CliError> {
    queue.clear().await?;
    info!("Queue purge requested");
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
