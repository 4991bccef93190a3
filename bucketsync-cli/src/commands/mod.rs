pub mod bucket;
pub mod diff;
pub mod sync;

use std::path::PathBuf;

use anyhow::Result;
use bucketsync::{FileSource, RemoteObjectRecord};
use clap::Args;

use crate::state;

/// Where the desired files come from and where the snapshot lives.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Local directory to mirror.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Glob, relative to `--dir`, of files to leave out. Repeatable.
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// JSON snapshot of the objects already in the bucket.
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,
}

impl SourceArgs {
    pub fn file_source(&self) -> FileSource {
        FileSource {
            files: Vec::new(),
            dir: self.dir.clone(),
            ignore: self.ignore.clone(),
        }
    }

    /// Previously synced objects, or nothing without `--state`.
    pub fn load_state(&self) -> Result<Vec<RemoteObjectRecord>> {
        match self.state {
            Some(ref path) => state::load(path),
            None => Ok(Vec::new()),
        }
    }
}
