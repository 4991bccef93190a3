//! `bucketsync bucket`: bucket inspection and administration.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use bucketsync_storage::{CreateBucket, ObjectStore, Redirect, WebsiteSettings};
use clap::Subcommand;
use serde::Serialize;

use crate::StorageArgs;

#[derive(Subcommand, Debug)]
pub enum BucketCommand {
    /// Print whether the bucket exists.
    Exists { bucket: String },

    /// Print the bucket's region and endpoints as JSON.
    Get {
        bucket: String,

        /// Include the static website configuration.
        #[arg(long)]
        website: bool,
    },

    /// List every bucket visible to the caller.
    List,

    /// Create a bucket in `--region` (default `us-east-1`).
    Create {
        name: String,

        /// Canned ACL.
        #[arg(long, default_value = "private")]
        acl: String,

        /// Tag as KEY=VALUE. Repeatable.
        #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Serve the bucket as a public static website.
    Website {
        bucket: String,

        #[arg(long, default_value = "index.html")]
        index: String,

        #[arg(long)]
        error: Option<String>,

        /// Redirect every request to this host instead.
        #[arg(long, value_name = "HOST")]
        redirect: Option<String>,

        #[arg(long, default_value = "http")]
        protocol: String,
    },
}

pub async fn run(command: BucketCommand, storage: &StorageArgs) -> Result<()> {
    let (store, config) = storage.connect().await;

    match command {
        BucketCommand::Exists { bucket } => {
            let exists = store.bucket_exists(&bucket).await?;
            println!("{exists}");
        }
        BucketCommand::Get { bucket, website } => {
            let details = store
                .get_bucket(&bucket, website)
                .await
                .with_context(|| format!("failed to describe bucket '{bucket}'"))?;
            print_json(&details)?;
        }
        BucketCommand::List => {
            print_json(&store.list_buckets().await?)?;
        }
        BucketCommand::Create { name, acl, tags } => {
            let mut request = CreateBucket::new(name);
            request.acl = acl;
            if let Some(region) = config.region {
                request.region = region;
            }
            request.tags = tags.into_iter().collect::<BTreeMap<_, _>>();

            let location = store.create_bucket(&request).await?;
            println!("{}", location.unwrap_or(request.name));
        }
        BucketCommand::Website {
            bucket,
            index,
            error,
            redirect,
            protocol,
        } => {
            let settings = WebsiteSettings {
                index,
                error,
                redirect: redirect.map(|hostname| Redirect { hostname, protocol }),
                ..WebsiteSettings::new(bucket)
            };
            store.set_website(&settings).await?;
            println!("'{}' is now a static website", settings.bucket);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid tag '{s}'; expected KEY=VALUE")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_splits_on_first_equals() {
        assert_eq!(
            parse_tag("owner=web=team").unwrap(),
            ("owner".to_string(), "web=team".to_string())
        );
        assert_eq!(parse_tag("env=").unwrap(), ("env".to_string(), String::new()));
    }

    #[test]
    fn tag_requires_a_key() {
        assert!(parse_tag("=value").is_err());
        assert!(parse_tag("novalue").is_err());
    }
}
