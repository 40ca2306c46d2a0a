//! refstore - sharded reference-data access layer for generated API docs
//!
//! # Architecture
//!
//! - **Transport**: the only component doing raw I/O; retry with
//!   jittered backoff plus a FIFO concurrency gate
//! - **Cache tiers**: process-memory maps per resource type, optional
//!   persistent revalidating tier for small resources
//! - **Readers**: manifest, sharded catalog, sharded lookup, routing
//!   table, changelog - all methods on one [`ReferenceStore`] facade
//! - **Cross-package resolver**: progressive-prefix matching of type
//!   references against every enabled package's routing data
//! - **Environment switch**: one constructor-time decision between the
//!   local-filesystem mirror and the remote blob store
//!
//! # Usage example
//!
//! ```no_run
//! use refstore::{ReferenceStore, StoreConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> refstore::Result<()> {
//! let store = ReferenceStore::with_config(StoreConfig::local("./reference-data"))?;
//!
//! if let Some(pointer) = store.latest_build().await? {
//!     let catalog = store.catalog(&pointer.build_id, "langchain-core").await?;
//!     println!("{} public symbols", catalog.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod shard;
pub mod store;
pub mod transport;

pub use config::{
    CacheWindows, ProjectConfig, ProjectRegistry, RetryBudget, RetryPolicy, StoreConfig, StoreMode,
};
pub use error::{Result, StoreError};
pub use resolver::{CrossPackageResolver, ResolvedLink};
pub use store::{EagerPolicy, ReferenceStore};

// Re-export the shard-key derivation; producers and tests share it
pub use shard::{shard_key, symbol_shard};
