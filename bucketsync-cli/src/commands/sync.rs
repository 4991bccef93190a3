//! `bucketsync sync`: bring a bucket in line with a local directory.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bucketsync::{SyncRequest, SyncResult, Synchronizer};
use clap::Args;
use tracing::debug;

use super::SourceArgs;
use crate::{StorageArgs, state};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Destination bucket.
    pub bucket: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Delete every object listed in the state file instead of uploading.
    #[arg(long)]
    pub remove: bool,

    /// Do not warn when the bucket does not exist.
    #[arg(long)]
    pub no_warning: bool,
}

impl SyncArgs {
    pub async fn run(self, storage: &StorageArgs) -> Result<()> {
        if self.source.dir.is_none() && !self.remove {
            bail!("--dir is required unless --remove is given");
        }

        let existing = self.source.load_state()?;
        debug!("{} objects in previous snapshot", existing.len());
        let (store, config) = storage.connect().await;
        let synchronizer = Synchronizer::with_config(Arc::new(store), &config);

        let request = SyncRequest {
            remove: self.remove,
            no_warning: self.no_warning,
            ..SyncRequest::new(&self.bucket, self.source.file_source()).with_existing(existing)
        };
        let result = synchronizer
            .sync(&request)
            .await
            .with_context(|| format!("sync to '{}' failed", self.bucket))?;

        // A skipped sync leaves the previous snapshot untouched.
        if let Some(ref path) = self.source.state
            && (result.updated || !result.src_files.is_empty())
        {
            state::save(path, &result.remote_state())?;
        }

        print_summary(&self.bucket, &result);
        Ok(())
    }
}

fn print_summary(bucket: &str, result: &SyncResult) {
    for file in &result.uploaded_files {
        println!("+ {}", file.key);
    }
    for object in &result.deleted_files {
        println!("- {}", object.key);
    }

    if result.updated {
        println!(
            "'{bucket}' synced ({} uploaded, {} deleted, {} total)",
            result.uploaded_files.len(),
            result.deleted_files.len(),
            result.src_files.len()
        );
    } else {
        println!("'{bucket}' is up to date");
    }
}
