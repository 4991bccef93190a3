//! bucketsync: mirror a local directory into an S3 bucket.
//!
//! # Usage
//!
//! ```text
//! bucketsync sync <bucket> --dir <path> [--ignore <glob>]... [--state <file>] [--remove] [--no-warning]
//! bucketsync diff --dir <path> [--ignore <glob>]... [--state <file>]
//! bucketsync bucket exists|get|list|create|website ...
//! ```
//!
//! Region and endpoint come from the environment (`AWSX_REGION`,
//! `AWS_REGION`, `REGION`, `DB_REGION`, `AWSX_S3_ENDPOINT`) unless
//! `--region` / `--endpoint` are given.

mod commands;
mod state;

use anyhow::Result;
use bucketsync_storage::{S3Store, StorageConfig};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{bucket::BucketCommand, diff::DiffArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "bucketsync",
    version,
    about = "Sync a local file tree into an S3 bucket",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload new and changed files, then delete objects that disappeared.
    Sync(SyncArgs),

    /// Show what a sync would upload and delete, without contacting S3.
    Diff(DiffArgs),

    /// Inspect and administer buckets.
    Bucket {
        #[command(subcommand)]
        command: BucketCommand,
    },
}

/// Storage flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// AWS region, overriding the environment.
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// S3 endpoint override, e.g. a local MinIO.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Maximum number of uploads in flight.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

impl StorageArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> StorageConfig {
        self.apply(StorageConfig::from_env())
    }

    fn apply(&self, mut config: StorageConfig) -> StorageConfig {
        if let Some(ref region) = self.region {
            config.region = Some(region.clone());
        }
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint_override = Some(endpoint.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.upload_concurrency = concurrency;
        }
        config
    }

    pub async fn connect(&self) -> (S3Store, StorageConfig) {
        let config = self.config();
        (S3Store::connect(&config).await, config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(&cli.storage).await,
        Commands::Diff(args) => args.run().await,
        Commands::Bucket { command } => commands::bucket::run(command, &cli.storage).await,
    }
}
