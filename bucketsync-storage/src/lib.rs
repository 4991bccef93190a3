//! Object storage layer for bucketsync.
//!
//! Provides:
//! - The [`ObjectStore`] seam used by the synchronizer
//! - An S3 implementation with bucket administration (details, listing,
//!   creation, static website setup)
//! - Batched object removal capped at [`MAX_DELETE_BATCH`] keys
//! - Website property normalization for infrastructure tooling

pub mod config;
pub mod error;
pub mod s3_store;
pub mod store;
pub mod types;
pub mod website;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use s3_store::S3Store;
pub use store::{MAX_DELETE_BATCH, ObjectStore, get_object, put_object, remove_objects};
pub use types::*;
