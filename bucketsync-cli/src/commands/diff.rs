//! `bucketsync diff`: compare a directory with the state file, offline.

use anyhow::{Result, bail};
use bucketsync::{FileDiff, diff_files};
use clap::Args;

use super::SourceArgs;

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the full diff as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub async fn run(self) -> Result<()> {
        if self.source.dir.is_none() {
            bail!("--dir is required");
        }

        let previous = self.source.load_state()?;
        let files = self.source.file_source().resolve().await?;
        let diff = diff_files(files, &previous);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&diff)?);
        } else {
            print_diff(&diff);
        }
        Ok(())
    }
}

fn print_diff(diff: &FileDiff) {
    if !diff.diff {
        println!("no changes ({} files)", diff.src_files.len());
        return;
    }

    for file in &diff.changed_files {
        println!("+ {}", file.key);
    }
    for object in &diff.deleted_files {
        println!("- {}", object.key);
    }
    println!(
        "{} to upload, {} to delete, {} unchanged",
        diff.changed_files.len(),
        diff.deleted_files.len(),
        diff.unchanged_files.len()
    );
}
