//! Persistence for opaque byte blobs, addressed by string keys.
//!
//! Backends know nothing about what they store. The feed cache serializes
//! its snapshot itself and hands the bytes over.

pub mod backend;
pub mod error;
mod key;

pub use crate::backend::StorageBackend;
pub use crate::key::validate as validate_key;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
